//! PostgreSQL config table as a configuration source

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use crate::domain::ports::{ConfigEntry, ConfigSource};
use crate::entity::config;
use crate::error::DomainError;

pub struct PostgresConfigSource {
    db: DatabaseConnection,
}

impl PostgresConfigSource {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConfigSource for PostgresConfigSource {
    async fn load_entries(&self) -> Result<Vec<ConfigEntry>, DomainError> {
        let rows = config::Entity::find()
            .order_by_asc(config::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
