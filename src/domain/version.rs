//! Bot run (version) metadata.

use serde::{Deserialize, Serialize};

use super::record::RawTradeDocument;
use super::timestamp::{format_timestamp_ms, parse_epoch_ms};

/// One labelled execution of the strategy. Its trades live in a collection
/// named after `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub version: String,
    /// Creation time as stored; unit is inferred like trade timestamps.
    pub date: String,
    pub balance: f64,
}

impl VersionRecord {
    pub fn created_ms(&self) -> Option<i64> {
        parse_epoch_ms(&self.date)
    }

    pub fn created_display(&self) -> String {
        self.created_ms()
            .and_then(format_timestamp_ms)
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn collection(&self) -> &str {
        &self.version
    }
}

/// A run together with the documents of its trade collection, as handed over
/// by a store.
#[derive(Debug, Clone)]
pub struct RunDocuments {
    pub version: VersionRecord,
    pub trades: Vec<RawTradeDocument>,
}
