//! Run-level view: balance curve, per-trade P&L bars and the headline totals
//! measured against the run's starting balance.

use serde::Serialize;

use super::aggregation::{in_close_order, round2};
use super::record::TradeRecord;
use super::timestamp::format_timestamp_ms;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancePoint {
    pub time: String,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlBar {
    pub time: String,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOverview {
    pub start_balance_usd: f64,
    pub balance_curve: Vec<BalancePoint>,
    pub pnl_bars: Vec<PnlBar>,
    pub total_pnl_usd: f64,
    pub total_ror_pct: f64,
    /// Trades closed with a positive ror.
    pub win_count: usize,
    pub lose_count: usize,
}

impl RunOverview {
    pub fn compute(records: &[TradeRecord], start_balance_usd: f64) -> Self {
        let ordered = in_close_order(records);

        let mut balance_curve = Vec::with_capacity(ordered.len());
        let mut pnl_bars = Vec::with_capacity(ordered.len());
        let mut win_count = 0usize;

        for record in &ordered {
            let time = record
                .close_time_ms
                .and_then(format_timestamp_ms)
                .unwrap_or_default();
            balance_curve.push(BalancePoint {
                time: time.clone(),
                balance: round2(record.balance_usd),
            });
            pnl_bars.push(PnlBar {
                time,
                profit: round2(record.profit_usd),
            });
            // NaN compares false, so a missing ror counts as a loss
            if record.ror_pct > 0.0 {
                win_count += 1;
            }
        }

        let total_pnl_usd = ordered
            .last()
            .map(|r| r.balance_usd - start_balance_usd)
            .unwrap_or(0.0);

        let total_ror_pct = if start_balance_usd > 0.0 {
            total_pnl_usd / start_balance_usd * 100.0
        } else {
            0.0
        };

        RunOverview {
            start_balance_usd,
            balance_curve,
            pnl_bars,
            total_pnl_usd,
            total_ror_pct,
            win_count,
            lose_count: ordered.len() - win_count,
        }
    }
}
