//! Groupings behind the dashboard charts: monthly performance, ror
//! distribution, long/short split and per-instrument comparison.
//!
//! Every function is a pure pass over its input; nothing is cached between
//! calls.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::record::{Side, TradeRecord};
use super::timestamp::month_key;

pub const UNKNOWN_MONTH: &str = "Unknown";
pub const UNKNOWN_INSTRUMENT: &str = "UNKNOWN";

/// Bin edges in percent. Each bin is `[min, max)`.
pub const ROR_BINS: [(&str, f64, f64); 9] = [
    ("< -5%", f64::NEG_INFINITY, -5.0),
    ("-5~-3%", -5.0, -3.0),
    ("-3~-1%", -3.0, -1.0),
    ("-1~0%", -1.0, 0.0),
    ("0~1%", 0.0, 1.0),
    ("1~3%", 1.0, 3.0),
    ("3~5%", 3.0, 5.0),
    ("5~10%", 5.0, 10.0),
    ("> 10%", 10.0, f64::INFINITY),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub month: String,
    pub profit: f64,
    pub trades: usize,
    pub wins: usize,
    pub win_rate_pct: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RorBin {
    pub range: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideSummary {
    pub side: Side,
    pub profit: f64,
    pub trades: usize,
    pub wins: usize,
    pub win_rate_pct: String,
    pub avg_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentSummary {
    pub coin: String,
    pub profit: f64,
    pub trades: usize,
    pub wins: usize,
    pub win_rate_pct: String,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    trades: usize,
    wins: usize,
    profit: f64,
}

impl Tally {
    fn add(&mut self, record: &TradeRecord) {
        self.trades += 1;
        self.profit += record.profit_usd;
        if record.is_win() {
            self.wins += 1;
        }
    }

    fn win_rate_pct(&self) -> String {
        format_rate_pct(self.wins, self.trades)
    }
}

/// `wins / trades * 100` with one decimal; `"0.0"` when there are no trades.
pub fn format_rate_pct(wins: usize, trades: usize) -> String {
    if trades == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", wins as f64 / trades as f64 * 100.0)
}

/// Rounds to cents. A value that rounds to zero comes back as `0.0`, never
/// `-0.0`, so it compares and serializes like any other break-even figure.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// References to `records` ordered by close time ascending. The sort is
/// stable; records without a close time keep their relative order at the end.
pub fn in_close_order(records: &[TradeRecord]) -> Vec<&TradeRecord> {
    let mut ordered: Vec<&TradeRecord> = records.iter().collect();
    ordered.sort_by_key(|r| (r.close_time_ms.is_none(), r.close_time_ms));
    ordered
}

/// One point per calendar month of close time, ascending by month.
pub fn monthly_rollup(records: &[TradeRecord]) -> Vec<MonthlyPoint> {
    let mut months: BTreeMap<String, Tally> = BTreeMap::new();

    for record in in_close_order(records) {
        let key = record
            .close_time_ms
            .and_then(month_key)
            .unwrap_or_else(|| UNKNOWN_MONTH.to_string());
        months.entry(key).or_default().add(record);
    }

    months
        .into_iter()
        .map(|(month, tally)| MonthlyPoint {
            month,
            profit: tally.profit,
            trades: tally.trades,
            wins: tally.wins,
            win_rate_pct: tally.win_rate_pct(),
        })
        .collect()
}

/// Count of records per return-on-risk bin, always all nine bins in fixed
/// order. Records without a ror are left out.
pub fn ror_histogram(records: &[TradeRecord]) -> Vec<RorBin> {
    let mut counts = [0usize; ROR_BINS.len()];

    for record in records.iter().filter(|r| r.has_ror()) {
        let ror = record.ror_pct;
        if let Some(i) = ROR_BINS
            .iter()
            .position(|&(_, min, max)| ror >= min && ror < max)
        {
            counts[i] += 1;
        }
    }

    ROR_BINS
        .iter()
        .zip(counts)
        .map(|(&(range, _, _), count)| RorBin { range, count })
        .collect()
}

/// Long bucket first, then short; both are emitted even when empty.
pub fn side_split(records: &[TradeRecord]) -> Vec<SideSummary> {
    let mut long = Tally::default();
    let mut short = Tally::default();

    for record in records {
        match record.side {
            Side::Long => long.add(record),
            Side::Short => short.add(record),
        }
    }

    [(Side::Long, long), (Side::Short, short)]
        .into_iter()
        .map(|(side, tally)| SideSummary {
            side,
            profit: round2(tally.profit),
            trades: tally.trades,
            wins: tally.wins,
            win_rate_pct: tally.win_rate_pct(),
            avg_profit: if tally.trades > 0 {
                round2(tally.profit / tally.trades as f64)
            } else {
                0.0
            },
        })
        .collect()
}

/// Per base symbol, most profitable first. Ties keep encounter order.
pub fn instrument_rollup(records: &[TradeRecord]) -> Vec<InstrumentSummary> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Tally)> = Vec::new();

    for record in records {
        let coin = record.base_symbol().unwrap_or(UNKNOWN_INSTRUMENT);
        let slot = match index.get(coin) {
            Some(&i) => i,
            None => {
                index.insert(coin.to_string(), groups.len());
                groups.push((coin.to_string(), Tally::default()));
                groups.len() - 1
            }
        };
        groups[slot].1.add(record);
    }

    let mut summaries: Vec<InstrumentSummary> = groups
        .into_iter()
        .map(|(coin, tally)| InstrumentSummary {
            coin,
            profit: round2(tally.profit),
            trades: tally.trades,
            wins: tally.wins,
            win_rate_pct: tally.win_rate_pct(),
        })
        .collect();

    // sort_by is stable
    summaries.sort_by(|a, b| b.profit.total_cmp(&a.profit));
    summaries
}
