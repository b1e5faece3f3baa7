//! CSV directory trade store.
//!
//! Layout: `versions.csv` (`_id,version,date,balance`) next to one
//! `<version>.csv` per run holding the raw document columns
//! (`symbol,side,profit,ror,balance,enterTime,closeTime`).

use crate::domain::error::DashboardError;
use crate::domain::record::RawTradeDocument;
use crate::domain::version::VersionRecord;
use crate::ports::trade_store_port::TradeStorePort;
use std::fs;
use std::path::{Path, PathBuf};

pub const VERSIONS_FILE: &str = "versions.csv";

pub struct CsvStore {
    base_path: PathBuf,
}

impl CsvStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn versions_path(&self) -> PathBuf {
        self.base_path.join(VERSIONS_FILE)
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf, DashboardError> {
        if collection.is_empty()
            || collection.contains(['/', '\\'])
            || collection == "."
            || collection == ".."
        {
            return Err(DashboardError::Store {
                path: self.base_path.display().to_string(),
                reason: format!("invalid collection name {:?}", collection),
            });
        }
        Ok(self.base_path.join(format!("{}.csv", collection)))
    }

    fn write_versions(&self, versions: &[VersionRecord]) -> Result<(), DashboardError> {
        let path = self.versions_path();
        let store_err = |e: csv::Error| DashboardError::Store {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let mut wtr = csv::Writer::from_path(&path).map_err(store_err)?;
        for version in versions {
            wtr.serialize(version).map_err(store_err)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Store a run and its trades. The trade file is written first and only
    /// then registered in `versions.csv`; a failure at either step leaves no
    /// trace of the run, so the same label can be imported again.
    pub fn insert_run(
        &self,
        version: &VersionRecord,
        docs: &[RawTradeDocument],
    ) -> Result<usize, DashboardError> {
        let path = self.collection_path(version.collection())?;
        let mut versions = self.list_versions()?;
        if versions.iter().any(|v| v.version == version.version || v.id == version.id) {
            return Err(DashboardError::Store {
                path: self.versions_path().display().to_string(),
                reason: format!("run {} already exists", version.version),
            });
        }

        // an unregistered trade file left by an interrupted import is overwritten
        let result = self
            .write_collection(&path, docs)
            .and_then(|rows| {
                versions.push(version.clone());
                self.write_versions(&versions).map(|()| rows)
            });

        if result.is_err() && path.is_file() {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "could not remove partial trade file");
            }
        }
        result
    }

    fn write_collection(
        &self,
        path: &Path,
        docs: &[RawTradeDocument],
    ) -> Result<usize, DashboardError> {
        let store_err = |e: csv::Error| DashboardError::Store {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let mut wtr = csv::Writer::from_path(path).map_err(store_err)?;
        for doc in docs {
            wtr.serialize(doc).map_err(store_err)?;
        }
        wtr.flush()?;

        tracing::debug!(path = %path.display(), rows = docs.len(), "wrote trades");
        Ok(docs.len())
    }
}

/// Read a raw trade export. Rows that fail to decode as CSV abort the read;
/// rows with bad values are left for the normalizer to reject one by one.
pub fn read_trade_export(path: &Path) -> Result<Vec<RawTradeDocument>, DashboardError> {
    let content = fs::read_to_string(path).map_err(|e| DashboardError::Store {
        path: path.display().to_string(),
        reason: format!("failed to read: {}", e),
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut docs = Vec::new();
    for result in rdr.deserialize::<RawTradeDocument>() {
        let doc = result.map_err(|e| DashboardError::Store {
            path: path.display().to_string(),
            reason: format!("CSV parse error: {}", e),
        })?;
        docs.push(doc);
    }

    tracing::debug!(path = %path.display(), rows = docs.len(), "read trade export");
    Ok(docs)
}

impl TradeStorePort for CsvStore {
    fn list_versions(&self) -> Result<Vec<VersionRecord>, DashboardError> {
        let path = self.versions_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| DashboardError::Store {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut versions = Vec::new();
        for result in rdr.deserialize::<VersionRecord>() {
            versions.push(result.map_err(|e| DashboardError::Store {
                path: path.display().to_string(),
                reason: format!("CSV parse error: {}", e),
            })?);
        }
        Ok(versions)
    }

    fn fetch_trades(&self, collection: &str) -> Result<Vec<RawTradeDocument>, DashboardError> {
        let path = self.collection_path(collection)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_trade_export(&path)
    }

    fn delete_version(&self, id: &str) -> Result<bool, DashboardError> {
        let mut versions = self.list_versions()?;
        let Some(pos) = versions.iter().position(|v| v.id == id) else {
            return Ok(false);
        };
        let removed = versions.remove(pos);

        let trades = self.collection_path(removed.collection())?;
        if trades.exists() {
            fs::remove_file(&trades)?;
        }
        self.write_versions(&versions)?;

        tracing::info!(id, version = %removed.version, "deleted run");
        Ok(true)
    }
}
