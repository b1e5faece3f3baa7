//! Raw trade documents and their canonical, typed form.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::error::{ParseError, TradeField};
use super::timestamp::parse_epoch_ms;

pub const QUOTE_SUFFIX: &str = "USDT";

const MS_PER_HOUR: f64 = 3_600_000.0;

/// A trade document as the bot wrote it to the store.
///
/// Nothing about it is trusted: every field may be missing, numbers may be
/// stored as strings or as JSON numbers, and timestamps carry no unit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTradeDocument {
    #[serde(default, deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub side: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub profit: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ror: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub balance: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub enter_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub close_time: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Flag(bool),
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Scalar::Text(s) if s.trim().is_empty() => None,
        Scalar::Text(s) => Some(s),
        Scalar::Int(i) => Some(i.to_string()),
        Scalar::Float(f) => Some(f.to_string()),
        Scalar::Flag(_) => None,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// `"long"` is the only spelling that maps to [`Side::Long`]; anything
    /// else, including a missing side, counts as short.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("long") => Side::Long,
            _ => Side::Short,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// Canonical trade record consumed by the aggregation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub symbol: Option<String>,
    pub side: Side,
    pub profit_usd: f64,
    /// NaN when the document had no usable ror.
    pub ror_pct: f64,
    pub balance_usd: f64,
    pub enter_time_ms: Option<i64>,
    pub close_time_ms: Option<i64>,
}

impl TradeRecord {
    /// Normalize one raw document. `index` is only used to label errors.
    pub fn from_raw(doc: &RawTradeDocument, index: usize) -> Result<Self, ParseError> {
        let profit_usd = parse_money(doc.profit.as_deref(), TradeField::Profit, index)?;
        let balance_usd = parse_money(doc.balance.as_deref(), TradeField::Balance, index)?;

        let ror_pct = doc
            .ror
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|r| r.is_finite())
            .unwrap_or(f64::NAN);

        Ok(TradeRecord {
            symbol: doc
                .symbol
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            side: Side::from_raw(doc.side.as_deref()),
            profit_usd,
            ror_pct,
            balance_usd,
            enter_time_ms: doc.enter_time.as_deref().and_then(parse_epoch_ms),
            close_time_ms: doc.close_time.as_deref().and_then(parse_epoch_ms),
        })
    }

    pub fn is_win(&self) -> bool {
        self.profit_usd > 0.0
    }

    pub fn has_ror(&self) -> bool {
        !self.ror_pct.is_nan()
    }

    /// Symbol with the quote currency stripped, e.g. `BTCUSDT` -> `BTC`.
    pub fn base_symbol(&self) -> Option<&str> {
        self.symbol
            .as_deref()
            .map(|s| s.strip_suffix(QUOTE_SUFFIX).unwrap_or(s))
    }

    /// Hours between entry and close, when both timestamps are positive.
    pub fn hold_hours(&self) -> Option<f64> {
        match (self.enter_time_ms, self.close_time_ms) {
            (Some(enter), Some(close)) if enter > 0 && close > 0 => {
                Some((close - enter) as f64 / MS_PER_HOUR)
            }
            _ => None,
        }
    }
}

fn parse_money(raw: Option<&str>, field: TradeField, index: usize) -> Result<f64, ParseError> {
    let raw = raw.ok_or_else(|| ParseError {
        index,
        field,
        reason: "missing".into(),
    })?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError {
            index,
            field,
            reason: format!("not a number: {:?}", raw),
        }),
    }
}

/// Result of normalizing a whole run.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub records: Vec<TradeRecord>,
    pub errors: Vec<ParseError>,
}

/// Normalize every document, keeping input order. A document whose profit or
/// balance cannot be parsed is dropped and reported; the rest continue.
pub fn normalize_all(docs: &[RawTradeDocument]) -> NormalizedBatch {
    let mut batch = NormalizedBatch {
        records: Vec::with_capacity(docs.len()),
        errors: Vec::new(),
    };

    for (index, doc) in docs.iter().enumerate() {
        match TradeRecord::from_raw(doc, index) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                tracing::warn!(index = e.index, field = %e.field, "dropping trade: {}", e.reason);
                batch.errors.push(e);
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(profit: &str, ror: &str) -> RawTradeDocument {
        RawTradeDocument {
            symbol: Some("BTCUSDT".into()),
            side: Some("long".into()),
            profit: Some(profit.into()),
            ror: Some(ror.into()),
            balance: Some("1000".into()),
            enter_time: Some("1700000000".into()),
            close_time: Some("1700003600000".into()),
        }
    }

    #[test]
    fn from_raw_parses_all_fields() {
        let record = TradeRecord::from_raw(&doc("12.5", "3.2"), 0).unwrap();
        assert_eq!(record.symbol.as_deref(), Some("BTCUSDT"));
        assert_eq!(record.side, Side::Long);
        assert_eq!(record.profit_usd, 12.5);
        assert_eq!(record.ror_pct, 3.2);
        assert_eq!(record.balance_usd, 1000.0);
        assert_eq!(record.enter_time_ms, Some(1_700_000_000_000));
        assert_eq!(record.close_time_ms, Some(1_700_003_600_000));
    }

    #[test]
    fn mixed_units_give_a_one_hour_hold() {
        let record = TradeRecord::from_raw(&doc("1", "1"), 0).unwrap();
        assert_eq!(record.hold_hours(), Some(1.0));
    }

    #[test]
    fn unparseable_ror_becomes_nan() {
        let record = TradeRecord::from_raw(&doc("1", "n/a"), 0).unwrap();
        assert!(record.ror_pct.is_nan());
        assert!(!record.has_ror());
    }

    #[test]
    fn missing_ror_becomes_nan() {
        let mut raw = doc("1", "0");
        raw.ror = None;
        let record = TradeRecord::from_raw(&raw, 0).unwrap();
        assert!(record.ror_pct.is_nan());
    }

    #[test]
    fn bad_profit_is_fatal_for_the_record() {
        let err = TradeRecord::from_raw(&doc("lots", "1"), 7).unwrap_err();
        assert_eq!(err.index, 7);
        assert_eq!(err.field, TradeField::Profit);
    }

    #[test]
    fn missing_balance_is_fatal_for_the_record() {
        let mut raw = doc("1", "1");
        raw.balance = None;
        let err = TradeRecord::from_raw(&raw, 2).unwrap_err();
        assert_eq!(err.field, TradeField::Balance);
        assert_eq!(err.reason, "missing");
    }

    #[test]
    fn nan_profit_string_is_rejected() {
        let err = TradeRecord::from_raw(&doc("NaN", "1"), 0).unwrap_err();
        assert_eq!(err.field, TradeField::Profit);
    }

    #[test]
    fn unknown_side_counts_as_short() {
        assert_eq!(Side::from_raw(Some("short")), Side::Short);
        assert_eq!(Side::from_raw(Some("LONG")), Side::Short);
        assert_eq!(Side::from_raw(Some("buy")), Side::Short);
        assert_eq!(Side::from_raw(None), Side::Short);
    }

    #[test]
    fn base_symbol_strips_quote_suffix() {
        let record = TradeRecord::from_raw(&doc("1", "1"), 0).unwrap();
        assert_eq!(record.base_symbol(), Some("BTC"));

        let mut raw = doc("1", "1");
        raw.symbol = Some("ETHBUSD".into());
        let record = TradeRecord::from_raw(&raw, 0).unwrap();
        assert_eq!(record.base_symbol(), Some("ETHBUSD"));
    }

    #[test]
    fn hold_hours_requires_both_positive_times() {
        let mut raw = doc("1", "1");
        raw.enter_time = None;
        let record = TradeRecord::from_raw(&raw, 0).unwrap();
        assert_eq!(record.hold_hours(), None);

        let mut raw = doc("1", "1");
        raw.enter_time = Some("0".into());
        let record = TradeRecord::from_raw(&raw, 0).unwrap();
        assert_eq!(record.hold_hours(), None);
    }

    #[test]
    fn normalize_all_drops_bad_records_and_keeps_order() {
        let docs = vec![doc("1", "1"), doc("oops", "1"), doc("-2", "-1")];
        let batch = normalize_all(&docs);

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].profit_usd, 1.0);
        assert_eq!(batch.records[1].profit_usd, -2.0);
        assert_eq!(batch.errors.len(), 1);
        assert_eq!(batch.errors[0].index, 1);
    }

    #[test]
    fn deserializes_numbers_and_strings_alike() {
        let json = r#"{
            "_id": "65a1",
            "symbol": "ETHUSDT",
            "side": "short",
            "profit": -3.25,
            "ror": "-1.5",
            "balance": "990.1",
            "enterTime": 1700000000,
            "closeTime": null
        }"#;
        let raw: RawTradeDocument = serde_json::from_str(json).unwrap();
        assert_eq!(raw.profit.as_deref(), Some("-3.25"));
        assert_eq!(raw.enter_time.as_deref(), Some("1700000000"));
        assert_eq!(raw.close_time, None);

        let record = TradeRecord::from_raw(&raw, 0).unwrap();
        assert_eq!(record.side, Side::Short);
        assert_eq!(record.profit_usd, -3.25);
        assert_eq!(record.close_time_ms, None);
    }
}
