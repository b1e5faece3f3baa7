//! Configuration validation.
//!
//! Checks the `[store]`, `[dashboard]` and `[logging]` sections before any
//! store is opened.

use crate::domain::error::DashboardError;
use crate::ports::config_port::ConfigPort;

pub const BACKENDS: [&str; 2] = ["csv", "sqlite"];
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    validate_backend(config)?;
    validate_store_path(config)?;
    validate_pool_size(config)?;
    validate_log_level(config)?;
    Ok(())
}

fn validate_backend(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    match config.get_string("store", "backend") {
        None => Err(DashboardError::ConfigMissing {
            section: "store".to_string(),
            key: "backend".to_string(),
        }),
        Some(b) if BACKENDS.contains(&b.trim().to_lowercase().as_str()) => Ok(()),
        Some(b) => Err(DashboardError::ConfigInvalid {
            section: "store".to_string(),
            key: "backend".to_string(),
            reason: format!("unknown backend '{}', expected csv or sqlite", b.trim()),
        }),
    }
}

fn validate_store_path(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    match config.get_string("store", "path") {
        Some(p) if !p.trim().is_empty() => Ok(()),
        _ => Err(DashboardError::ConfigMissing {
            section: "store".to_string(),
            key: "path".to_string(),
        }),
    }
}

pub const DEFAULT_POOL_SIZE: i64 = 4;

/// `[store] pool_size` as a connection count. Values below 1 or beyond
/// `u32` are rejected rather than clamped or truncated.
pub fn pool_size(config: &dyn ConfigPort) -> Result<u32, DashboardError> {
    let value = config.get_int("store", "pool_size", DEFAULT_POOL_SIZE);
    u32::try_from(value)
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| DashboardError::ConfigInvalid {
            section: "store".to_string(),
            key: "pool_size".to_string(),
            reason: format!("pool_size must be between 1 and {}, got {}", u32::MAX, value),
        })
}

fn validate_pool_size(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    pool_size(config).map(|_| ())
}

fn validate_log_level(config: &dyn ConfigPort) -> Result<(), DashboardError> {
    match config.get_string("logging", "level") {
        None => Ok(()),
        Some(l) if LOG_LEVELS.contains(&l.trim().to_lowercase().as_str()) => Ok(()),
        Some(l) => Err(DashboardError::ConfigInvalid {
            section: "logging".to_string(),
            key: "level".to_string(),
            reason: format!("unknown level '{}'", l.trim()),
        }),
    }
}
