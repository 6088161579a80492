//! Ledger schema tool
//!
//! Prepares the ledger tables in `DATABASE_URL`, seeds the default site
//! configuration when `SEED_DEFAULT_CONFIG` is set, and checks that the
//! configuration loads.

use std::sync::Arc;

use anyhow::Context;
use reputation_ledger::adapters::LogNotificationDispatcher;
use reputation_ledger::bootstrap;
use reputation_ledger::config::Config;
use reputation_ledger::domain::ports::{ConfigProvider, DAILY_RANK_LIMIT_KEY};
use reputation_ledger::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing(telemetry::DEFAULT_FILTER);

    let config = Config::from_env().context("Failed to load configuration")?;

    let running = bootstrap::connect(&config, Arc::new(LogNotificationDispatcher))
        .await
        .context("Failed to prepare ledger")?;
    running.config_refresh.abort();

    let daily_limit = running
        .ledger
        .config
        .get_int(DAILY_RANK_LIMIT_KEY)
        .context("Site configuration has no daily rank limit")?;

    tracing::info!(
        entries = running.ledger.config.snapshot().len(),
        daily_limit = daily_limit,
        "Ledger ready"
    );
    Ok(())
}
