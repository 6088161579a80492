//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod classifier;
pub mod config;
pub mod notification;
pub mod repositories;

#[cfg(test)]
pub use classifier::MockObjectClassifier;
pub use classifier::ObjectClassifier;
#[cfg(test)]
pub use config::MockConfigSource;
pub use config::{
    ConfigEntry, ConfigProvider, ConfigSource, DAILY_RANK_LIMIT_EXCLUDE_KEY, DAILY_RANK_LIMIT_KEY,
};
pub use notification::NotificationDispatcher;
pub use repositories::{
    ActivityRepository, ContentRepository, LedgerStore, LedgerTransaction, UserRankRepository,
};
