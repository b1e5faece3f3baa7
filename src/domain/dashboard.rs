//! Everything one dashboard view shows, computed in a single call.
//!
//! A new selection means a new [`Dashboard::compute`] over the full record
//! set; there is no partial recompute, so a result never mixes records from
//! two runs or two filters.

use serde::Serialize;

use super::aggregation::{
    instrument_rollup, monthly_rollup, ror_histogram, side_split, InstrumentSummary,
    MonthlyPoint, RorBin, SideSummary,
};
use super::filter::{available_instruments, filter_by_instrument, InstrumentSelector};
use super::overview::RunOverview;
use super::record::TradeRecord;
use super::summary::OverallSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub selector: String,
    pub instruments: Vec<String>,
    pub summary: Option<OverallSummary>,
    pub overview: RunOverview,
    pub monthly: Vec<MonthlyPoint>,
    pub ror_distribution: Vec<RorBin>,
    pub sides: Vec<SideSummary>,
    /// Always over the whole run, so the comparison chart can drive selection.
    pub coin_comparison: Vec<InstrumentSummary>,
}

impl Dashboard {
    pub fn compute(
        records: &[TradeRecord],
        selector: &InstrumentSelector,
        start_balance_usd: f64,
    ) -> Self {
        let filtered = filter_by_instrument(records, selector);
        tracing::debug!(
            selector = %selector,
            total = records.len(),
            selected = filtered.len(),
            "computing dashboard"
        );

        Dashboard {
            selector: selector.to_string(),
            instruments: available_instruments(records),
            summary: OverallSummary::compute(&filtered),
            overview: RunOverview::compute(&filtered, start_balance_usd),
            monthly: monthly_rollup(&filtered),
            ror_distribution: ror_histogram(&filtered),
            sides: side_split(&filtered),
            coin_comparison: instrument_rollup(records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::Side;

    fn rec(symbol: &str, profit: f64) -> TradeRecord {
        TradeRecord {
            symbol: Some(symbol.into()),
            side: Side::Long,
            profit_usd: profit,
            ror_pct: 1.0,
            balance_usd: 1000.0 + profit,
            enter_time_ms: None,
            close_time_ms: Some(1_700_000_000_000),
        }
    }

    #[test]
    fn selection_narrows_everything_but_coin_comparison() {
        let records = vec![rec("BTCUSDT", 5.0), rec("ETHUSDT", -2.0), rec("BTCUSDT", 3.0)];
        let d = Dashboard::compute(&records, &InstrumentSelector::Base("ETH".into()), 1000.0);

        assert_eq!(d.selector, "ETH");
        assert_eq!(d.summary.as_ref().unwrap().total_trades, 1);
        assert_eq!(d.sides[0].trades, 1);
        assert_eq!(d.monthly.len(), 1);
        assert_eq!(d.coin_comparison.len(), 2);
        assert_eq!(d.instruments, vec!["BTC", "ETH"]);
    }

    #[test]
    fn unknown_instrument_gives_empty_view() {
        let records = vec![rec("BTCUSDT", 5.0)];
        let d = Dashboard::compute(&records, &InstrumentSelector::Base("DOGE".into()), 1000.0);

        assert_eq!(d.summary, None);
        assert!(d.monthly.is_empty());
        assert_eq!(d.ror_distribution.iter().map(|b| b.count).sum::<usize>(), 0);
        assert_eq!(d.coin_comparison.len(), 1);
    }

    #[test]
    fn recompute_is_identical() {
        let records = vec![rec("BTCUSDT", 5.0), rec("ETHUSDT", -2.0)];
        let a = Dashboard::compute(&records, &InstrumentSelector::All, 1000.0);
        let b = Dashboard::compute(&records, &InstrumentSelector::All, 1000.0);
        assert_eq!(a, b);
    }
}
