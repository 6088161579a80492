//! Schema bootstrap
//!
//! Creates the ledger tables from the SeaORM entities and the indexes the
//! entities cannot express, then optionally seeds the site configuration.

use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Schema, Set,
};

use crate::domain::ports::ConfigEntry;
use crate::entity::{activity, answer, comment, config, question, users};
use crate::error::DomainError;

/// At most one active record per (object, user, type, trigger)
const ACTIVITY_ACTIVE_TUPLE_INDEX: &str = "\
CREATE UNIQUE INDEX IF NOT EXISTS activity_active_tuple_uidx \
ON activity (object_id, user_id, activity_type, COALESCE(trigger_user_id, '')) \
WHERE cancelled = 0";

/// Serves the daily rank sum
const ACTIVITY_DAILY_RANK_INDEX: &str = "\
CREATE INDEX IF NOT EXISTS activity_user_daily_rank_idx \
ON activity (user_id, updated_at) \
WHERE cancelled = 0 AND has_rank = 1";

const ACTIVITY_OBJECT_INDEX: &str = "\
CREATE INDEX IF NOT EXISTS activity_object_idx ON activity (object_id)";

/// Create missing tables and indexes
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DomainError> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let tables = [
        schema
            .create_table_from_entity(users::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(question::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(answer::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(comment::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(activity::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(config::Entity)
            .if_not_exists()
            .to_owned(),
    ];

    for table in &tables {
        db.execute(backend.build(table)).await?;
    }

    for index in [
        ACTIVITY_ACTIVE_TUPLE_INDEX,
        ACTIVITY_DAILY_RANK_INDEX,
        ACTIVITY_OBJECT_INDEX,
    ] {
        db.execute_unprepared(index).await?;
    }

    tracing::info!(tables = tables.len(), "Ledger schema ensured");
    Ok(())
}

/// Insert `entries` when the config table is empty. Returns rows inserted.
pub async fn seed_config(
    db: &DatabaseConnection,
    entries: Vec<ConfigEntry>,
) -> Result<usize, DomainError> {
    let existing = config::Entity::find().count(db).await?;
    if existing > 0 || entries.is_empty() {
        tracing::debug!(existing = existing, "Config table already populated, skipping seed");
        return Ok(0);
    }

    let count = entries.len();
    let models = entries.into_iter().map(|e| config::ActiveModel {
        id: Set(e.id),
        key: Set(e.key),
        value: Set(e.value),
    });
    config::Entity::insert_many(models).exec(db).await?;

    tracing::info!(entries = count, "Seeded default site configuration");
    Ok(count)
}
