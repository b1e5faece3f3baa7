//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{read_trade_export, CsvStore};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
#[cfg(feature = "sqlite")]
use crate::adapters::sqlite_adapter::SqliteStore;
use crate::domain::aggregation::instrument_rollup;
use crate::domain::config_validation::validate_config;
use crate::domain::dashboard::Dashboard;
use crate::domain::error::{DashboardError, ParseError};
use crate::domain::filter::InstrumentSelector;
use crate::domain::record::{normalize_all, RawTradeDocument};
use crate::domain::summary::format_hold_time;
use crate::domain::version::VersionRecord;
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;
use crate::ports::trade_store_port::TradeStorePort;

const DEFAULT_OUTPUT: &str = "dashboard.json";

#[derive(Parser, Debug)]
#[command(name = "tradedash", about = "Trade analytics for a futures trading bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the dashboard for one bot run and write it as JSON
    Report {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        version: String,
        /// Base symbol such as BTC, or ALL
        #[arg(long)]
        coin: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List bot runs
    Versions {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List instruments traded in a run
    Coins {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        version: String,
    },
    /// Delete a run and its trades
    DeleteVersion {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        id: String,
    },
    /// Import a CSV trade export as a new run
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        version: String,
        /// Starting balance of the run in USD
        #[arg(long)]
        balance: f64,
        #[arg(short, long)]
        file: PathBuf,
    },
}

impl Command {
    fn config_path(&self) -> &Path {
        match self {
            Command::Report { config, .. }
            | Command::Versions { config }
            | Command::Coins { config, .. }
            | Command::DeleteVersion { config, .. }
            | Command::Import { config, .. } => config,
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match FileConfigAdapter::from_file(cli.command.config_path()) {
        Ok(c) => c,
        Err(e) => {
            logging::init(logging::DEFAULT_LEVEL);
            tracing::error!("{e}");
            return (&e).into();
        }
    };

    let level = config
        .get_string("logging", "level")
        .unwrap_or_else(|| logging::DEFAULT_LEVEL.to_string());
    logging::init(level.trim());

    match dispatch(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

fn dispatch(command: Command, config: &FileConfigAdapter) -> Result<(), DashboardError> {
    validate_config(config)?;
    let store = StoreHandle::open(config)?;

    let result = match command {
        Command::Report {
            version,
            coin,
            output,
            ..
        } => run_report(&store, config, &version, coin.as_deref(), output.as_deref()),
        Command::Versions { .. } => run_versions(&store),
        Command::Coins { version, .. } => run_coins(&store, &version),
        Command::DeleteVersion { id, .. } => run_delete(&store, &id),
        Command::Import {
            version,
            balance,
            file,
            ..
        } => run_import(&store, &version, balance, &file),
    };

    store.shutdown();
    result
}

/// The configured trade store, owned by the command that opened it.
pub enum StoreHandle {
    Csv(CsvStore),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteStore),
}

impl StoreHandle {
    pub fn open(config: &dyn ConfigPort) -> Result<Self, DashboardError> {
        let backend = config
            .get_string("store", "backend")
            .map(|b| b.trim().to_lowercase())
            .unwrap_or_default();
        let path = config
            .get_string("store", "path")
            .ok_or_else(|| DashboardError::ConfigMissing {
                section: "store".into(),
                key: "path".into(),
            })?;

        match backend.as_str() {
            "csv" => Ok(StoreHandle::Csv(CsvStore::new(PathBuf::from(path.trim())))),
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(StoreHandle::Sqlite(SqliteStore::open(config)?)),
            other => Err(DashboardError::ConfigInvalid {
                section: "store".into(),
                key: "backend".into(),
                reason: format!("backend '{}' is not available in this build", other),
            }),
        }
    }

    fn port(&self) -> &dyn TradeStorePort {
        match self {
            StoreHandle::Csv(s) => s,
            #[cfg(feature = "sqlite")]
            StoreHandle::Sqlite(s) => s,
        }
    }

    /// Store a new run with its trades as one unit; a failure leaves the
    /// store as it was.
    pub fn insert_run(
        &self,
        version: &VersionRecord,
        docs: &[RawTradeDocument],
    ) -> Result<usize, DashboardError> {
        match self {
            StoreHandle::Csv(s) => s.insert_run(version, docs),
            #[cfg(feature = "sqlite")]
            StoreHandle::Sqlite(s) => s.insert_run(version, docs),
        }
    }

    pub fn shutdown(self) {
        match self {
            StoreHandle::Csv(_) => {}
            #[cfg(feature = "sqlite")]
            StoreHandle::Sqlite(s) => s.shutdown(),
        }
    }
}

impl TradeStorePort for StoreHandle {
    fn list_versions(&self) -> Result<Vec<VersionRecord>, DashboardError> {
        self.port().list_versions()
    }

    fn fetch_trades(&self, collection: &str) -> Result<Vec<RawTradeDocument>, DashboardError> {
        self.port().fetch_trades(collection)
    }

    fn delete_version(&self, id: &str) -> Result<bool, DashboardError> {
        self.port().delete_version(id)
    }
}

/// Dashboard of one run plus the documents that had to be dropped.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub version: VersionRecord,
    pub dropped: Vec<ParseError>,
    pub dashboard: Dashboard,
}

/// Load a run from `store` and compute its dashboard for `selector`.
pub fn build_run_report(
    store: &dyn TradeStorePort,
    version: &str,
    selector: &InstrumentSelector,
) -> Result<RunReport, DashboardError> {
    let run = store.load_run(version)?;
    tracing::info!(version, documents = run.trades.len(), "loaded run");

    let batch = normalize_all(&run.trades);
    if !batch.errors.is_empty() {
        tracing::warn!(
            dropped = batch.errors.len(),
            kept = batch.records.len(),
            "some trades could not be normalized"
        );
    }

    let dashboard = Dashboard::compute(&batch.records, selector, run.version.balance);
    if let InstrumentSelector::Base(base) = selector {
        if !dashboard.instruments.iter().any(|i| i == base) {
            tracing::warn!(coin = %base, "run has no trades for this instrument");
        }
    }

    Ok(RunReport {
        version: run.version,
        dropped: batch.errors,
        dashboard,
    })
}

/// `--coin` wins over `[dashboard] coin`; otherwise every instrument.
pub fn resolve_selector(coin_override: Option<&str>, config: &dyn ConfigPort) -> InstrumentSelector {
    coin_override
        .map(str::to_string)
        .or_else(|| config.get_string("dashboard", "coin"))
        .map(|c| InstrumentSelector::parse(&c))
        .unwrap_or_default()
}

pub fn resolve_output(output_override: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    output_override
        .map(Path::to_path_buf)
        .or_else(|| {
            config
                .get_string("dashboard", "output")
                .filter(|s| !s.trim().is_empty())
                .map(|s| PathBuf::from(s.trim()))
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

fn run_report(
    store: &StoreHandle,
    config: &FileConfigAdapter,
    version: &str,
    coin: Option<&str>,
    output: Option<&Path>,
) -> Result<(), DashboardError> {
    let selector = resolve_selector(coin, config);
    let report = build_run_report(store, version, &selector)?;

    print_summary(&report);

    let output = resolve_output(output, config);
    let adapter = JsonReportAdapter::new(config.get_bool("dashboard", "pretty", true));
    adapter.write(
        &report.dashboard,
        &report.version,
        &output.display().to_string(),
    )?;
    println!("\nReport written to: {}", output.display());
    Ok(())
}

fn print_summary(report: &RunReport) {
    let d = &report.dashboard;
    println!("=== {} [{}] ===", report.version.version, d.selector);
    println!("Since:            {}", report.version.created_display());
    println!("Start Balance:    {:.2}$", d.overview.start_balance_usd);
    println!("Total PnL:        {:.2}$", d.overview.total_pnl_usd);
    println!("Total ROR:        {:.2}%", d.overview.total_ror_pct);

    let Some(s) = &d.summary else {
        println!("No trades.");
        return;
    };

    println!("Total Trades:     {}", s.total_trades);
    println!("Win Rate:         {:.1}%", s.win_rate_pct);
    println!("Avg Profit:       {:.2}$", s.avg_profit_usd);
    println!("Avg ROR:          {:.2}%", s.avg_ror_pct);
    println!("Best Trade:       {:.2}$", s.best_trade_usd);
    println!("Worst Trade:      {:.2}$", s.worst_trade_usd);
    println!("Risk / Reward:    {}", s.risk_reward);
    println!("Win Streak:       {}", s.max_win_streak);
    println!("Lose Streak:      {}", s.max_lose_streak);
    println!("Avg Hold Time:    {}", format_hold_time(s.avg_hold_hours));

    // a single month is not worth a table
    if d.monthly.len() > 1 {
        println!("\n=== Monthly ===");
        for m in &d.monthly {
            println!(
                "  {}:  {} trades, {}% win rate, {:.2}$",
                m.month, m.trades, m.win_rate_pct, m.profit
            );
        }
    }

    println!("\n=== Long vs Short ===");
    for side in &d.sides {
        println!(
            "  {}:  {} trades, {}% win rate, {:.2}$ (avg {:.2}$)",
            side.side, side.trades, side.win_rate_pct, side.profit, side.avg_profit
        );
    }

    if !report.dropped.is_empty() {
        println!("\n{} trade(s) skipped:", report.dropped.len());
        for e in &report.dropped {
            println!("  {}", e);
        }
    }
}

fn run_versions(store: &StoreHandle) -> Result<(), DashboardError> {
    let versions = store.list_versions()?;
    if versions.is_empty() {
        tracing::info!("no runs found");
        return Ok(());
    }
    for v in &versions {
        println!(
            "{}\t{}\t{}\t{:.2}",
            v.id,
            v.version,
            v.created_display(),
            v.balance
        );
    }
    Ok(())
}

fn run_coins(store: &StoreHandle, version: &str) -> Result<(), DashboardError> {
    let run = store.load_run(version)?;
    let batch = normalize_all(&run.trades);
    for coin in instrument_rollup(&batch.records) {
        println!(
            "{}\t{} trades\t{}% win\t{:.2}$",
            coin.coin, coin.trades, coin.win_rate_pct, coin.profit
        );
    }
    Ok(())
}

fn run_delete(store: &StoreHandle, id: &str) -> Result<(), DashboardError> {
    if store.delete_version(id)? {
        println!("Deleted run {}", id);
        Ok(())
    } else {
        Err(DashboardError::VersionNotFound {
            version: id.to_string(),
        })
    }
}

fn run_import(
    store: &StoreHandle,
    version: &str,
    balance: f64,
    file: &Path,
) -> Result<(), DashboardError> {
    let docs = read_trade_export(file)?;

    let batch = normalize_all(&docs);
    if batch.records.is_empty() {
        // nothing in the export would ever reach a report
        if let Some(first) = batch.errors.into_iter().next() {
            return Err(first.into());
        }
    } else if !batch.errors.is_empty() {
        tracing::warn!(
            invalid = batch.errors.len(),
            "importing documents that will be skipped by reports"
        );
    }

    let record = new_version(version, balance);
    let rows = store.insert_run(&record, &docs)?;
    println!("Imported {} trades as {} (id {})", rows, record.version, record.id);
    Ok(())
}

/// A fresh run record stamped with the current time in epoch seconds.
pub fn new_version(label: &str, balance: f64) -> VersionRecord {
    let now = chrono::Utc::now();
    VersionRecord {
        id: format!("{:x}", now.timestamp_millis()),
        version: label.to_string(),
        date: now.timestamp().to_string(),
        balance,
    }
}
