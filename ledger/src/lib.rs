//! Reputation Ledger
//!
//! Awards, reverses and caps user rank as a side effect of community actions:
//! votes, accepted answers, account activation and content deletion.
//! Uses hexagonal (ports & adapters) architecture; every workflow runs in one
//! transaction obtained from the ledger store port.

pub mod adapters;
pub mod app;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod entity;
pub mod error;
pub mod ledger;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

pub use error::{ConfigError, DomainError};
pub use ledger::ReputationLedger;
