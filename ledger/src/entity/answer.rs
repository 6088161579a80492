use sea_orm::entity::prelude::*;

use crate::domain::entities::{AnswerInfo, ObjectId, UserId};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "answer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub question_id: String,
    pub user_id: String,
    pub vote_count: i64,
    pub adopted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AnswerInfo {
    fn from(m: Model) -> Self {
        AnswerInfo {
            id: ObjectId(m.id),
            question_id: ObjectId(m.question_id),
            user_id: UserId(m.user_id),
            vote_count: m.vote_count,
            adopted: m.adopted,
        }
    }
}
