use sea_orm::entity::prelude::*;

use crate::domain::entities::{ObjectId, QuestionInfo, UserId};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "question")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub vote_count: i64,
    pub accepted_answer_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for QuestionInfo {
    fn from(m: Model) -> Self {
        QuestionInfo {
            id: ObjectId(m.id),
            user_id: UserId(m.user_id),
            vote_count: m.vote_count,
            accepted_answer_id: m.accepted_answer_id.map(ObjectId),
        }
    }
}
