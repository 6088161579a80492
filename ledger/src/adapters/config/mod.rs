//! Site configuration service
//!
//! Holds an immutable [`ConfigSnapshot`] behind an `ArcSwap`. The snapshot is
//! loaded explicitly from a [`ConfigSource`] and replaced wholesale on
//! refresh, so readers never observe a half-updated configuration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::domain::ports::{ConfigEntry, ConfigProvider, ConfigSource};
use crate::error::DomainError;

/// Immutable view of all configuration rows, keyed by config key
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    entries: HashMap<String, ConfigEntry>,
}

impl ConfigSnapshot {
    pub fn from_entries(entries: impl IntoIterator<Item = ConfigEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.key.clone(), e)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, key: &str) -> Result<&ConfigEntry, DomainError> {
        self.entries
            .get(key)
            .ok_or_else(|| DomainError::NotFound(format!("config key {}", key)))
    }
}

impl ConfigProvider for ConfigSnapshot {
    fn get_config_type(&self, key: &str) -> Result<i32, DomainError> {
        Ok(self.entry(key)?.id)
    }

    fn get_int(&self, key: &str) -> Result<i64, DomainError> {
        let raw = self.entry(key)?.value.trim();
        if let Ok(value) = raw.parse::<i64>() {
            return Ok(value);
        }

        // Values are stored as JSON; accept quoted numbers too
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Number(n)) => n.as_i64(),
            Ok(serde_json::Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            DomainError::Internal(format!("config key {} is not an integer: {}", key, raw))
        })
    }

    fn get_array_string(&self, key: &str) -> Result<Vec<String>, DomainError> {
        let raw = self.entry(key)?.value.trim();
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(raw).map_err(|e| {
            DomainError::Internal(format!("config key {} is not a string array: {}", key, e))
        })
    }
}

/// Configuration provider with an explicit load/refresh lifecycle
pub struct CachedConfigProvider<S>
where
    S: ConfigSource,
{
    source: Arc<S>,
    snapshot: ArcSwap<ConfigSnapshot>,
}

impl<S> CachedConfigProvider<S>
where
    S: ConfigSource,
{
    /// Load the first snapshot from `source`
    pub async fn load(source: Arc<S>) -> Result<Self, DomainError> {
        let entries = source.load_entries().await?;
        let snapshot = ConfigSnapshot::from_entries(entries);
        tracing::info!(entries = snapshot.len(), "Site configuration loaded");

        Ok(Self {
            source,
            snapshot: ArcSwap::from_pointee(snapshot),
        })
    }

    /// Build a provider around an already materialised snapshot
    pub fn with_snapshot(source: Arc<S>, snapshot: ConfigSnapshot) -> Self {
        Self {
            source,
            snapshot: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Reload from the source and swap the snapshot in.
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<usize, DomainError> {
        let entries = self.source.load_entries().await?;
        let snapshot = ConfigSnapshot::from_entries(entries);
        let count = snapshot.len();
        self.snapshot.store(Arc::new(snapshot));
        tracing::debug!(entries = count, "Site configuration refreshed");
        Ok(count)
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.snapshot.load_full()
    }
}

impl<S> CachedConfigProvider<S>
where
    S: ConfigSource + 'static,
{
    /// Refresh periodically until the returned task is aborted
    pub fn spawn_refresh(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick fires immediately; the snapshot is already fresh
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh().await {
                    tracing::warn!(
                        error = %e,
                        "Site configuration refresh failed, keeping previous snapshot"
                    );
                }
            }
        })
    }
}

impl<S> ConfigProvider for CachedConfigProvider<S>
where
    S: ConfigSource,
{
    fn get_config_type(&self, key: &str) -> Result<i32, DomainError> {
        self.snapshot.load().get_config_type(key)
    }

    fn get_int(&self, key: &str) -> Result<i64, DomainError> {
        self.snapshot.load().get_int(key)
    }

    fn get_array_string(&self, key: &str) -> Result<Vec<String>, DomainError> {
        self.snapshot.load().get_array_string(key)
    }
}

/// Fixed in-process configuration rows
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource {
    entries: Vec<ConfigEntry>,
}

impl StaticConfigSource {
    pub fn new(entries: Vec<ConfigEntry>) -> Self {
        Self { entries }
    }

    /// Parse rows from a JSON array of `{ "id", "key", "value" }` objects
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let entries = serde_json::from_str(json)
            .map_err(|e| DomainError::Internal(format!("invalid config json: {}", e)))?;
        Ok(Self { entries })
    }
}

#[async_trait]
impl ConfigSource for StaticConfigSource {
    async fn load_entries(&self) -> Result<Vec<ConfigEntry>, DomainError> {
        Ok(self.entries.clone())
    }
}
