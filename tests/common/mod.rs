#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use tradedash::domain::error::DashboardError;
use tradedash::domain::record::{RawTradeDocument, Side, TradeRecord};
use tradedash::domain::version::VersionRecord;
use tradedash::ports::trade_store_port::TradeStorePort;

pub struct MockStore {
    pub versions: Mutex<Vec<VersionRecord>>,
    pub trades: Mutex<HashMap<String, Vec<RawTradeDocument>>>,
    pub errors: HashMap<String, String>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            versions: Mutex::new(Vec::new()),
            trades: Mutex::new(HashMap::new()),
            errors: HashMap::new(),
        }
    }

    pub fn with_run(self, id: &str, label: &str, balance: f64, docs: Vec<RawTradeDocument>) -> Self {
        self.versions.lock().unwrap().push(VersionRecord {
            id: id.to_string(),
            version: label.to_string(),
            date: "1700000000".to_string(),
            balance,
        });
        self.trades.lock().unwrap().insert(label.to_string(), docs);
        self
    }

    pub fn with_error(mut self, collection: &str, reason: &str) -> Self {
        self.errors.insert(collection.to_string(), reason.to_string());
        self
    }
}

impl TradeStorePort for MockStore {
    fn list_versions(&self) -> Result<Vec<VersionRecord>, DashboardError> {
        Ok(self.versions.lock().unwrap().clone())
    }

    fn fetch_trades(&self, collection: &str) -> Result<Vec<RawTradeDocument>, DashboardError> {
        if let Some(reason) = self.errors.get(collection) {
            return Err(DashboardError::Database {
                reason: reason.clone(),
            });
        }
        Ok(self
            .trades
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    fn delete_version(&self, id: &str) -> Result<bool, DashboardError> {
        let mut versions = self.versions.lock().unwrap();
        match versions.iter().position(|v| v.id == id) {
            Some(pos) => {
                let removed = versions.remove(pos);
                self.trades.lock().unwrap().remove(&removed.version);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Raw document with string fields, as the bot writes them.
pub fn raw(symbol: &str, side: &str, profit: &str, ror: &str, close_s: i64) -> RawTradeDocument {
    RawTradeDocument {
        symbol: Some(symbol.to_string()),
        side: Some(side.to_string()),
        profit: Some(profit.to_string()),
        ror: Some(ror.to_string()),
        balance: Some("1000".to_string()),
        enter_time: Some((close_s - 1800).to_string()),
        close_time: Some(close_s.to_string()),
    }
}

pub fn record(profit: f64, ror: f64) -> TradeRecord {
    TradeRecord {
        symbol: Some("BTCUSDT".to_string()),
        side: Side::Long,
        profit_usd: profit,
        ror_pct: ror,
        balance_usd: 1000.0,
        enter_time_ms: None,
        close_time_ms: None,
    }
}

pub fn record_at(symbol: &str, side: Side, profit: f64, ror: f64, close_ms: i64) -> TradeRecord {
    TradeRecord {
        symbol: Some(symbol.to_string()),
        side,
        profit_usd: profit,
        ror_pct: ror,
        balance_usd: 1000.0,
        enter_time_ms: Some(close_ms - 3_600_000),
        close_time_ms: Some(close_ms),
    }
}
