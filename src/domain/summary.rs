//! Overall statistics for the summary cards.

use serde::{Serialize, Serializer};
use std::fmt;

use super::aggregation::in_close_order;
use super::record::TradeRecord;

/// Average win over average loss. There is no meaningful ratio when the run
/// has no losing trades, so that case is its own variant instead of an
/// infinite float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiskReward {
    Ratio(f64),
    Unbounded,
}

impl RiskReward {
    pub fn ratio(&self) -> Option<f64> {
        match self {
            RiskReward::Ratio(r) => Some(*r),
            RiskReward::Unbounded => None,
        }
    }
}

impl fmt::Display for RiskReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskReward::Ratio(r) => write!(f, "{:.2}", r),
            RiskReward::Unbounded => write!(f, "∞"),
        }
    }
}

impl Serialize for RiskReward {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RiskReward::Ratio(r) => serializer.serialize_f64(*r),
            RiskReward::Unbounded => serializer.serialize_str("∞"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    pub total_trades: usize,
    pub total_profit_usd: f64,
    pub avg_profit_usd: f64,
    pub best_trade_usd: f64,
    pub worst_trade_usd: f64,
    pub avg_ror_pct: f64,
    pub win_rate_pct: f64,
    pub avg_win_usd: f64,
    pub avg_loss_usd: f64,
    pub risk_reward: RiskReward,
    pub max_win_streak: usize,
    pub max_lose_streak: usize,
    pub avg_hold_hours: Option<f64>,
}

impl OverallSummary {
    /// `None` for an empty sequence.
    pub fn compute(records: &[TradeRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let total_trades = records.len();
        let mut total_profit = 0.0_f64;
        let mut best = f64::NEG_INFINITY;
        let mut worst = f64::INFINITY;
        let mut ror_sum = 0.0_f64;
        let mut ror_count = 0usize;
        let mut wins = 0usize;
        let mut win_sum = 0.0_f64;
        let mut losses = 0usize;
        let mut loss_sum = 0.0_f64;
        let mut hold_sum = 0.0_f64;
        let mut hold_count = 0usize;

        for record in records {
            let pnl = record.profit_usd;
            total_profit += pnl;
            best = best.max(pnl);
            worst = worst.min(pnl);

            if record.has_ror() {
                ror_sum += record.ror_pct;
                ror_count += 1;
            }

            if record.is_win() {
                wins += 1;
                win_sum += pnl;
            } else {
                losses += 1;
                loss_sum += pnl;
            }

            if let Some(hours) = record.hold_hours().filter(|&h| h > 0.0) {
                hold_sum += hours;
                hold_count += 1;
            }
        }

        let avg_win_usd = if wins > 0 { win_sum / wins as f64 } else { 0.0 };
        let avg_loss_usd = if losses > 0 {
            (loss_sum / losses as f64).abs()
        } else {
            0.0
        };
        let risk_reward = if avg_loss_usd > 0.0 {
            RiskReward::Ratio(avg_win_usd / avg_loss_usd)
        } else {
            RiskReward::Unbounded
        };

        let (max_win_streak, max_lose_streak) = compute_streaks(records);

        Some(OverallSummary {
            total_trades,
            total_profit_usd: total_profit,
            avg_profit_usd: total_profit / total_trades as f64,
            best_trade_usd: best,
            worst_trade_usd: worst,
            avg_ror_pct: if ror_count > 0 {
                ror_sum / ror_count as f64
            } else {
                0.0
            },
            win_rate_pct: wins as f64 / total_trades as f64 * 100.0,
            avg_win_usd,
            avg_loss_usd,
            risk_reward,
            max_win_streak,
            max_lose_streak,
            avg_hold_hours: if hold_count > 0 {
                Some(hold_sum / hold_count as f64)
            } else {
                None
            },
        })
    }
}

/// Longest runs of wins and of non-wins, scanned in close-time order.
/// A zero-profit trade breaks a win streak and extends a losing one.
fn compute_streaks(records: &[TradeRecord]) -> (usize, usize) {
    let mut max_win = 0usize;
    let mut max_lose = 0usize;
    let mut cur_win = 0usize;
    let mut cur_lose = 0usize;

    for record in in_close_order(records) {
        if record.is_win() {
            cur_win += 1;
            cur_lose = 0;
            max_win = max_win.max(cur_win);
        } else {
            cur_lose += 1;
            cur_win = 0;
            max_lose = max_lose.max(cur_lose);
        }
    }

    (max_win, max_lose)
}

/// Text for the average hold time card.
pub fn format_hold_time(hours: Option<f64>) -> String {
    match hours {
        None => "N/A".to_string(),
        Some(h) if h < 1.0 => format!("{:.0}m", h * 60.0),
        Some(h) if h < 24.0 => format!("{:.1}h", h),
        Some(h) => format!("{:.1}d", h / 24.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::Side;
    use approx::assert_relative_eq;

    fn make_trade(profit: f64, ror: f64) -> TradeRecord {
        TradeRecord {
            symbol: Some("BTCUSDT".into()),
            side: Side::Long,
            profit_usd: profit,
            ror_pct: ror,
            balance_usd: 1000.0,
            enter_time_ms: None,
            close_time_ms: None,
        }
    }

    fn timed(profit: f64, enter: i64, close: i64) -> TradeRecord {
        TradeRecord {
            enter_time_ms: Some(enter),
            close_time_ms: Some(close),
            ..make_trade(profit, 0.0)
        }
    }

    #[test]
    fn summary_empty_sequence() {
        assert_eq!(OverallSummary::compute(&[]), None);
    }

    #[test]
    fn summary_reference_example() {
        let trades = vec![
            make_trade(10.0, 2.0),
            make_trade(-5.0, -1.0),
            make_trade(-3.0, -0.5),
            make_trade(20.0, 4.0),
        ];
        let s = OverallSummary::compute(&trades).unwrap();

        assert_eq!(s.total_trades, 4);
        assert_relative_eq!(s.total_profit_usd, 22.0);
        assert_relative_eq!(s.avg_profit_usd, 5.5);
        assert_relative_eq!(s.best_trade_usd, 20.0);
        assert_relative_eq!(s.worst_trade_usd, -5.0);
        assert_relative_eq!(s.win_rate_pct, 50.0);
        assert_relative_eq!(s.avg_ror_pct, 1.125);
        assert_relative_eq!(s.avg_win_usd, 15.0);
        assert_relative_eq!(s.avg_loss_usd, 4.0);
        assert_eq!(s.risk_reward, RiskReward::Ratio(3.75));
        assert_eq!(s.max_win_streak, 1);
        assert_eq!(s.max_lose_streak, 2);
        assert_eq!(s.avg_hold_hours, None);
    }

    #[test]
    fn summary_no_losses_is_unbounded_risk_reward() {
        let trades = vec![make_trade(1.0, 1.0), make_trade(2.0, 1.0)];
        let s = OverallSummary::compute(&trades).unwrap();
        assert_eq!(s.risk_reward, RiskReward::Unbounded);
        assert_eq!(s.risk_reward.ratio(), None);
        assert_eq!(s.risk_reward.to_string(), "∞");
        assert_relative_eq!(s.avg_loss_usd, 0.0);
    }

    #[test]
    fn summary_only_breakeven_trades_is_unbounded() {
        let trades = vec![make_trade(0.0, 0.0), make_trade(0.0, 0.0)];
        let s = OverallSummary::compute(&trades).unwrap();
        assert_eq!(s.risk_reward, RiskReward::Unbounded);
        assert_eq!(s.max_lose_streak, 2);
        assert_eq!(s.max_win_streak, 0);
        assert_relative_eq!(s.win_rate_pct, 0.0);
    }

    #[test]
    fn summary_avg_ror_ignores_nan() {
        let trades = vec![make_trade(1.0, f64::NAN), make_trade(1.0, 3.0)];
        let s = OverallSummary::compute(&trades).unwrap();
        assert_relative_eq!(s.avg_ror_pct, 3.0);

        let trades = vec![make_trade(1.0, f64::NAN)];
        let s = OverallSummary::compute(&trades).unwrap();
        assert_relative_eq!(s.avg_ror_pct, 0.0);
    }

    #[test]
    fn streaks_follow_close_time_not_input_order() {
        // in close order: win, win, loss, win
        let trades = vec![
            timed(5.0, 1, 4_000),
            timed(-1.0, 1, 3_000),
            timed(2.0, 1, 1_000),
            timed(3.0, 1, 2_000),
        ];
        let s = OverallSummary::compute(&trades).unwrap();
        assert_eq!(s.max_win_streak, 2);
        assert_eq!(s.max_lose_streak, 1);
    }

    #[test]
    fn hold_time_averages_positive_durations_only() {
        let hour = 3_600_000;
        let trades = vec![
            timed(1.0, 1_000, 1_000 + 2 * hour),
            timed(1.0, 1_000, 1_000 + 4 * hour),
            timed(1.0, 5_000, 5_000),
            make_trade(1.0, 1.0),
        ];
        let s = OverallSummary::compute(&trades).unwrap();
        assert_relative_eq!(s.avg_hold_hours.unwrap(), 3.0);
    }

    #[test]
    fn hold_time_is_none_when_nothing_qualifies() {
        let trades = vec![timed(1.0, 0, 10_000), timed(1.0, 10_000, 10_000)];
        let s = OverallSummary::compute(&trades).unwrap();
        assert_eq!(s.avg_hold_hours, None);
    }

    #[test]
    fn format_hold_time_picks_unit() {
        assert_eq!(format_hold_time(None), "N/A");
        assert_eq!(format_hold_time(Some(0.75)), "45m");
        assert_eq!(format_hold_time(Some(5.5)), "5.5h");
        assert_eq!(format_hold_time(Some(36.0)), "1.5d");
    }

    #[test]
    fn risk_reward_serializes_as_number_or_symbol() {
        assert_eq!(serde_json::to_string(&RiskReward::Ratio(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&RiskReward::Unbounded).unwrap(), "\"∞\"");
    }
}
