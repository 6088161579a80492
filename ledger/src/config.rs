use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Default interval between site configuration refreshes
const DEFAULT_CONFIG_REFRESH_SECS: u64 = 60;

/// Process-level settings read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// How often the site configuration snapshot is reloaded
    pub config_refresh_interval: Duration,
    /// Seed the default activity configuration when the config table is empty
    pub seed_default_config: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let refresh_secs = match env::var("CONFIG_REFRESH_SECS") {
            Ok(value) => value.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "CONFIG_REFRESH_SECS",
                value,
            })?,
            Err(_) => DEFAULT_CONFIG_REFRESH_SECS,
        };

        let seed_default_config = env::var("SEED_DEFAULT_CONFIG")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            config_refresh_interval: Duration::from_secs(refresh_secs),
            seed_default_config,
        })
    }
}
