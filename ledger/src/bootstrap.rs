//! PostgreSQL wiring
//!
//! Connects to the database, prepares the schema, loads the site
//! configuration and starts its refresh task.

use std::sync::Arc;

use sea_orm::Database;
use tokio::task::JoinHandle;

use crate::adapters::{
    CachedConfigProvider, IdPrefixClassifier, PostgresConfigSource, PostgresLedgerStore,
};
use crate::adapters::postgres::{ensure_schema, seed_config};
use crate::app::rank_config::default_entries;
use crate::config::Config;
use crate::domain::ports::NotificationDispatcher;
use crate::error::DomainError;
use crate::ledger::ReputationLedger;

pub type PostgresConfigProvider = CachedConfigProvider<PostgresConfigSource>;

pub type PostgresLedger<N> =
    ReputationLedger<PostgresLedgerStore, PostgresConfigProvider, IdPrefixClassifier, N>;

/// A connected ledger plus the background config refresh task
pub struct Running<N>
where
    N: NotificationDispatcher,
{
    pub ledger: PostgresLedger<N>,
    pub store: Arc<PostgresLedgerStore>,
    pub config_refresh: JoinHandle<()>,
}

/// Connect and wire a ledger against PostgreSQL
pub async fn connect<N>(config: &Config, notifier: Arc<N>) -> Result<Running<N>, DomainError>
where
    N: NotificationDispatcher,
{
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connected");

    ensure_schema(&db).await?;
    if config.seed_default_config {
        seed_config(&db, default_entries()).await?;
    }

    let source = Arc::new(PostgresConfigSource::new(db.clone()));
    let provider = Arc::new(CachedConfigProvider::load(source).await?);
    let config_refresh = provider
        .clone()
        .spawn_refresh(config.config_refresh_interval);

    let store = Arc::new(PostgresLedgerStore::new(db));
    let ledger = ReputationLedger::new(
        store.clone(),
        provider,
        Arc::new(IdPrefixClassifier),
        notifier,
    );

    Ok(Running {
        ledger,
        store,
        config_refresh,
    })
}
