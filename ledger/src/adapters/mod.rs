//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod classifier;
pub mod config;
pub mod notification;
pub mod postgres;

pub use classifier::IdPrefixClassifier;
pub use config::{CachedConfigProvider, ConfigSnapshot, StaticConfigSource};
pub use notification::{ChannelNotificationDispatcher, LogNotificationDispatcher};
pub use postgres::{PostgresConfigSource, PostgresLedgerStore, PostgresLedgerTransaction};
