use sea_orm::entity::prelude::*;

use crate::domain::ports::ConfigEntry;

/// Site configuration row; `id` doubles as the activity type
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    #[sea_orm(unique)]
    pub key: String,
    #[sea_orm(column_type = "Text")]
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ConfigEntry {
    fn from(m: Model) -> Self {
        ConfigEntry {
            id: m.id,
            key: m.key,
            value: m.value,
        }
    }
}
