//! Domain error types.

use std::fmt;

/// Raw document field a [`ParseError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeField {
    Profit,
    Balance,
}

impl fmt::Display for TradeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeField::Profit => write!(f, "profit"),
            TradeField::Balance => write!(f, "balance"),
        }
    }
}

/// A raw trade document that could not be normalized.
///
/// `index` is the position of the document in the batch it came from, so a
/// dropped record can be traced back to the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("record {index}: invalid {field}: {reason}")]
pub struct ParseError {
    pub index: usize,
    pub field: TradeField,
    pub reason: String,
}

/// Top-level error type for tradedash.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("store error in {path}: {reason}")]
    Store { path: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no bot run named {version}")]
    VersionNotFound { version: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DashboardError> for std::process::ExitCode {
    fn from(err: &DashboardError) -> Self {
        let code: u8 = match err {
            DashboardError::Io(_) | DashboardError::Report { .. } => 1,
            DashboardError::ConfigParse { .. }
            | DashboardError::ConfigMissing { .. }
            | DashboardError::ConfigInvalid { .. } => 2,
            DashboardError::Database { .. }
            | DashboardError::DatabaseQuery { .. }
            | DashboardError::Store { .. } => 3,
            DashboardError::Parse(_) => 4,
            DashboardError::VersionNotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
