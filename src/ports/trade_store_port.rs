//! Trade store port trait.

use crate::domain::error::DashboardError;
use crate::domain::record::RawTradeDocument;
use crate::domain::version::{RunDocuments, VersionRecord};

/// Read access to bot runs and their raw trade collections, plus deletion of
/// a whole run.
pub trait TradeStorePort {
    /// All runs, in the order the store keeps them.
    fn list_versions(&self) -> Result<Vec<VersionRecord>, DashboardError>;

    /// Raw documents of one trade collection, in stored order.
    fn fetch_trades(&self, collection: &str) -> Result<Vec<RawTradeDocument>, DashboardError>;

    /// Remove a run and purge its trade collection. Returns `false` when no
    /// run has that id.
    fn delete_version(&self, id: &str) -> Result<bool, DashboardError>;

    /// Look a run up by label and load its trades.
    fn load_run(&self, version: &str) -> Result<RunDocuments, DashboardError> {
        let record = self
            .list_versions()?
            .into_iter()
            .find(|v| v.version == version)
            .ok_or_else(|| DashboardError::VersionNotFound {
                version: version.to_string(),
            })?;
        let trades = self.fetch_trades(record.collection())?;
        Ok(RunDocuments {
            version: record,
            trades,
        })
    }
}
