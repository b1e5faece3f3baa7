//! Instrument selection over a record sequence.

use std::fmt;

use super::record::{QUOTE_SUFFIX, TradeRecord};

pub const ALL_SELECTOR: &str = "ALL";

/// Which instrument(s) a dashboard view is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InstrumentSelector {
    #[default]
    All,
    /// Base asset, e.g. `BTC`; matches the `BTCUSDT` contract.
    Base(String),
}

impl InstrumentSelector {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SELECTOR) {
            InstrumentSelector::All
        } else {
            InstrumentSelector::Base(trimmed.to_uppercase())
        }
    }

    pub fn matches(&self, record: &TradeRecord) -> bool {
        match self {
            InstrumentSelector::All => true,
            InstrumentSelector::Base(base) => record
                .symbol
                .as_deref()
                .and_then(|s| s.strip_suffix(QUOTE_SUFFIX))
                .is_some_and(|b| b == base),
        }
    }
}

impl fmt::Display for InstrumentSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentSelector::All => write!(f, "{}", ALL_SELECTOR),
            InstrumentSelector::Base(base) => write!(f, "{}", base),
        }
    }
}

/// Records matching `selector`, in their original order.
pub fn filter_by_instrument(records: &[TradeRecord], selector: &InstrumentSelector) -> Vec<TradeRecord> {
    records
        .iter()
        .filter(|r| selector.matches(r))
        .cloned()
        .collect()
}

/// Distinct base symbols in first-seen order; records without a symbol are
/// skipped since no selector can name them.
pub fn available_instruments(records: &[TradeRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        if let Some(base) = record.base_symbol() {
            if !seen.iter().any(|s| s == base) {
                seen.push(base.to_string());
            }
        }
    }
    seen
}
