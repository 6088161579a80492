//! Configuration port traits
//!
//! The ledger reads activity types, rank amounts and the daily cap through
//! [`ConfigProvider`]. Providers are fed from a [`ConfigSource`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Key of the per-user daily rank cap
pub const DAILY_RANK_LIMIT_KEY: &str = "daily_rank_limit";

/// Key of the activity keys that do not count towards the daily cap
pub const DAILY_RANK_LIMIT_EXCLUDE_KEY: &str = "daily_rank_limit.exclude";

/// One raw configuration row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Row id; doubles as the activity type for `{objectType}.{action}` keys
    pub id: i32,
    pub key: String,
    /// Raw value, either a JSON document or a bare string
    pub value: String,
}

impl ConfigEntry {
    pub fn new(id: i32, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Lookup contract consumed by the ledger
pub trait ConfigProvider: Send + Sync {
    /// Numeric type id of a key
    fn get_config_type(&self, key: &str) -> Result<i32, DomainError>;

    /// Integer value of a key
    fn get_int(&self, key: &str) -> Result<i64, DomainError>;

    /// String-array value of a key
    fn get_array_string(&self, key: &str) -> Result<Vec<String>, DomainError>;
}

/// Where configuration rows come from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn load_entries(&self) -> Result<Vec<ConfigEntry>, DomainError>;
}
