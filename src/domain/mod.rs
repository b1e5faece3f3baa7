//! Core domain types and the trade-analytics engine.

pub mod aggregation;
pub mod config_validation;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod overview;
pub mod record;
pub mod summary;
pub mod timestamp;
pub mod version;
