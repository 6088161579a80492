use chrono::Utc;
use sea_orm::entity::prelude::*;

use crate::domain::entities::{Activity, ActivityId, ObjectId, UserId};

/// `has_rank` and `cancelled` are stored as 0/1 flags
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub user_id: String,
    pub trigger_user_id: Option<String>,
    pub object_id: String,
    pub original_object_id: String,
    pub activity_type: i32,
    pub rank: i32,
    pub has_rank: i16,
    pub cancelled: i16,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub const FLAG_ON: i16 = 1;
pub const FLAG_OFF: i16 = 0;

pub fn flag(value: bool) -> i16 {
    if value {
        FLAG_ON
    } else {
        FLAG_OFF
    }
}

impl From<Model> for Activity {
    fn from(m: Model) -> Self {
        Activity {
            id: ActivityId(m.id),
            user_id: UserId(m.user_id),
            trigger_user_id: m.trigger_user_id.map(UserId),
            object_id: ObjectId(m.object_id),
            original_object_id: ObjectId(m.original_object_id),
            activity_type: m.activity_type,
            rank: m.rank,
            has_rank: m.has_rank == FLAG_ON,
            cancelled: m.cancelled == FLAG_ON,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
            cancelled_at: m.cancelled_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}
