//! tradedash: trade analytics for a crypto-futures bot dashboard.
//!
//! Hexagonal architecture: the analytics engine in [`domain`], port traits in
//! [`ports`], concrete stores and report writers in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;
