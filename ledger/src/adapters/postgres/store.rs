//! PostgreSQL ledger store
//!
//! Every repository port is implemented by [`PostgresLedgerTransaction`], a
//! thin wrapper around a SeaORM `DatabaseTransaction`. Dropping it without
//! committing rolls the transaction back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::entities::{
    Activity, ActivityId, AnswerInfo, NewActivity, ObjectId, QuestionInfo, UserId, VoteTarget,
};
use crate::domain::ports::{
    ActivityRepository, ContentRepository, LedgerStore, LedgerTransaction, UserRankRepository,
};
use crate::entity::activity::{self, flag, FLAG_OFF, FLAG_ON};
use crate::entity::{answer, comment, question, users};
use crate::error::DomainError;

/// PostgreSQL implementation of LedgerStore
#[derive(Clone)]
pub struct PostgresLedgerStore {
    db: DatabaseConnection,
}

impl PostgresLedgerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    type Tx = PostgresLedgerTransaction;

    async fn begin(&self) -> Result<Self::Tx, DomainError> {
        let tx = self.db.begin().await?;
        Ok(PostgresLedgerTransaction { tx })
    }
}

/// One open PostgreSQL transaction
pub struct PostgresLedgerTransaction {
    tx: DatabaseTransaction,
}

/// Rows touched by an UPDATE keyed on a primary key; zero means the row is missing
fn ensure_updated(rows_affected: u64, what: impl std::fmt::Display) -> Result<(), DomainError> {
    if rows_affected == 0 {
        return Err(DomainError::NotFound(what.to_string()));
    }
    Ok(())
}

#[async_trait]
impl LedgerTransaction for PostgresLedgerTransaction {
    async fn commit(self) -> Result<(), DomainError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl ActivityRepository for PostgresLedgerTransaction {
    async fn find_activity(
        &mut self,
        object_id: &ObjectId,
        user_id: &UserId,
        activity_type: i32,
        trigger_user_id: Option<&UserId>,
    ) -> Result<Option<Activity>, DomainError> {
        let query = activity::Entity::find()
            .filter(activity::Column::ObjectId.eq(object_id.as_str()))
            .filter(activity::Column::UserId.eq(user_id.as_str()))
            .filter(activity::Column::ActivityType.eq(activity_type));

        let query = match trigger_user_id {
            Some(trigger) => query.filter(activity::Column::TriggerUserId.eq(trigger.as_str())),
            None => query.filter(activity::Column::TriggerUserId.is_null()),
        };

        // Active (0) sorts before cancelled (1)
        let result = query
            .order_by_asc(activity::Column::Cancelled)
            .order_by_desc(activity::Column::UpdatedAt)
            .one(&self.tx)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn create_activity(&mut self, new: &NewActivity) -> Result<Activity, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = activity::ActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set(now),
            updated_at: Set(now),
            cancelled_at: Set(None),
            user_id: Set(new.user_id.0.clone()),
            trigger_user_id: Set(new.trigger_user_id.as_ref().map(|u| u.0.clone())),
            object_id: Set(new.object_id.0.clone()),
            original_object_id: Set(new.original_object_id.0.clone()),
            activity_type: Set(new.activity_type),
            rank: Set(new.rank),
            has_rank: Set(flag(new.has_rank)),
            cancelled: Set(FLAG_OFF),
        };

        let result = model.insert(&self.tx).await?;
        Ok(result.into())
    }

    async fn cancel_activity(&mut self, id: &ActivityId) -> Result<bool, DomainError> {
        let now = Utc::now().fixed_offset();

        let result = activity::Entity::update_many()
            .col_expr(activity::Column::Cancelled, Expr::value(FLAG_ON))
            .col_expr(activity::Column::CancelledAt, Expr::value(Some(now)))
            .col_expr(activity::Column::UpdatedAt, Expr::value(now))
            .filter(activity::Column::Id.eq(id.0))
            .filter(activity::Column::Cancelled.eq(FLAG_OFF))
            .exec(&self.tx)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn enable_activity(&mut self, id: &ActivityId) -> Result<bool, DomainError> {
        let now = Utc::now().fixed_offset();

        let result = activity::Entity::update_many()
            .col_expr(activity::Column::Cancelled, Expr::value(FLAG_OFF))
            .col_expr(
                activity::Column::CancelledAt,
                Expr::value(Option::<DateTime<chrono::FixedOffset>>::None),
            )
            .col_expr(activity::Column::UpdatedAt, Expr::value(now))
            .filter(activity::Column::Id.eq(id.0))
            .filter(activity::Column::Cancelled.eq(FLAG_ON))
            .exec(&self.tx)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn update_activity_rank(
        &mut self,
        id: &ActivityId,
        rank: i32,
        has_rank: bool,
    ) -> Result<(), DomainError> {
        let result = activity::Entity::update_many()
            .col_expr(activity::Column::Rank, Expr::value(rank))
            .col_expr(activity::Column::HasRank, Expr::value(flag(has_rank)))
            .col_expr(activity::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
            .filter(activity::Column::Id.eq(id.0))
            .exec(&self.tx)
            .await?;

        ensure_updated(result.rows_affected, format_args!("Activity {}", id))
    }

    async fn list_rank_bearing_active(
        &mut self,
        object_id: &ObjectId,
    ) -> Result<Vec<Activity>, DomainError> {
        let results = activity::Entity::find()
            .filter(activity::Column::ObjectId.eq(object_id.as_str()))
            .filter(activity::Column::Cancelled.eq(FLAG_OFF))
            .filter(activity::Column::HasRank.eq(FLAG_ON))
            .order_by_asc(activity::Column::CreatedAt)
            .all(&self.tx)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn sum_rank_since(
        &mut self,
        user_id: &UserId,
        since: DateTime<Utc>,
        excluded_types: &[i32],
    ) -> Result<i64, DomainError> {
        let mut query = activity::Entity::find()
            .filter(activity::Column::UserId.eq(user_id.as_str()))
            .filter(activity::Column::Cancelled.eq(FLAG_OFF))
            .filter(activity::Column::HasRank.eq(FLAG_ON))
            .filter(activity::Column::Rank.gt(0))
            .filter(activity::Column::UpdatedAt.gte(since.fixed_offset()));

        if !excluded_types.is_empty() {
            query = query.filter(
                activity::Column::ActivityType.is_not_in(excluded_types.iter().copied()),
            );
        }

        // SUM over zero rows is NULL
        let result: Option<Option<i64>> = query
            .select_only()
            .column_as(Expr::col(activity::Column::Rank).sum(), "total")
            .into_tuple()
            .one(&self.tx)
            .await?;

        Ok(result.flatten().unwrap_or(0))
    }

    async fn count_active(
        &mut self,
        object_id: &ObjectId,
        activity_type: i32,
    ) -> Result<i64, DomainError> {
        let count = activity::Entity::find()
            .filter(activity::Column::ObjectId.eq(object_id.as_str()))
            .filter(activity::Column::ActivityType.eq(activity_type))
            .filter(activity::Column::Cancelled.eq(FLAG_OFF))
            .count(&self.tx)
            .await?;

        Ok(count as i64)
    }
}

#[async_trait]
impl UserRankRepository for PostgresLedgerTransaction {
    async fn lock_users(&mut self, user_ids: &[UserId]) -> Result<(), DomainError> {
        if user_ids.is_empty() {
            return Ok(());
        }

        // SELECT ... ORDER BY id FOR UPDATE
        let locked: Vec<String> = users::Entity::find()
            .select_only()
            .column(users::Column::Id)
            .filter(users::Column::Id.is_in(user_ids.iter().map(|u| u.as_str())))
            .order_by_asc(users::Column::Id)
            .lock_exclusive()
            .into_tuple()
            .all(&self.tx)
            .await?;

        match user_ids.iter().find(|u| !locked.contains(&u.0)) {
            Some(missing) => Err(DomainError::NotFound(format!("User {}", missing))),
            None => Ok(()),
        }
    }

    async fn find_user_rank(&mut self, user_id: &UserId) -> Result<i32, DomainError> {
        let rank: Option<i32> = users::Entity::find_by_id(user_id.0.clone())
            .select_only()
            .column(users::Column::Rank)
            .into_tuple()
            .one(&self.tx)
            .await?;

        rank.ok_or_else(|| DomainError::NotFound(format!("User {}", user_id)))
    }

    async fn update_user_rank(&mut self, user_id: &UserId, rank: i32) -> Result<(), DomainError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Rank, Expr::value(rank))
            .filter(users::Column::Id.eq(user_id.as_str()))
            .exec(&self.tx)
            .await?;

        ensure_updated(result.rows_affected, format_args!("User {}", user_id))
    }
}

#[async_trait]
impl ContentRepository for PostgresLedgerTransaction {
    async fn adjust_vote_count(
        &mut self,
        target: &VoteTarget,
        delta: i64,
    ) -> Result<(), DomainError> {
        let rows_affected = match target {
            VoteTarget::Question(id) => {
                question::Entity::update_many()
                    .col_expr(
                        question::Column::VoteCount,
                        Expr::col(question::Column::VoteCount).add(delta),
                    )
                    .filter(question::Column::Id.eq(id.as_str()))
                    .exec(&self.tx)
                    .await?
                    .rows_affected
            }
            VoteTarget::Answer(id) => {
                answer::Entity::update_many()
                    .col_expr(
                        answer::Column::VoteCount,
                        Expr::col(answer::Column::VoteCount).add(delta),
                    )
                    .filter(answer::Column::Id.eq(id.as_str()))
                    .exec(&self.tx)
                    .await?
                    .rows_affected
            }
            VoteTarget::Comment(id) => {
                comment::Entity::update_many()
                    .col_expr(
                        comment::Column::VoteCount,
                        Expr::col(comment::Column::VoteCount).add(delta),
                    )
                    .filter(comment::Column::Id.eq(id.as_str()))
                    .exec(&self.tx)
                    .await?
                    .rows_affected
            }
        };

        ensure_updated(
            rows_affected,
            format_args!("{} {}", target.object_type(), target.object_id()),
        )
    }

    async fn find_vote_count(&mut self, target: &VoteTarget) -> Result<i64, DomainError> {
        let count: Option<i64> = match target {
            VoteTarget::Question(id) => {
                question::Entity::find_by_id(id.0.clone())
                    .select_only()
                    .column(question::Column::VoteCount)
                    .into_tuple()
                    .one(&self.tx)
                    .await?
            }
            VoteTarget::Answer(id) => {
                answer::Entity::find_by_id(id.0.clone())
                    .select_only()
                    .column(answer::Column::VoteCount)
                    .into_tuple()
                    .one(&self.tx)
                    .await?
            }
            VoteTarget::Comment(id) => {
                comment::Entity::find_by_id(id.0.clone())
                    .select_only()
                    .column(comment::Column::VoteCount)
                    .into_tuple()
                    .one(&self.tx)
                    .await?
            }
        };

        count.ok_or_else(|| {
            DomainError::NotFound(format!("{} {}", target.object_type(), target.object_id()))
        })
    }

    async fn find_question(&mut self, id: &ObjectId) -> Result<Option<QuestionInfo>, DomainError> {
        let result = question::Entity::find_by_id(id.0.clone())
            .one(&self.tx)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn lock_question(&mut self, id: &ObjectId) -> Result<QuestionInfo, DomainError> {
        // SELECT ... FOR UPDATE
        let result = question::Entity::find_by_id(id.0.clone())
            .lock_exclusive()
            .one(&self.tx)
            .await?;

        result
            .map(Into::into)
            .ok_or_else(|| DomainError::NotFound(format!("Question {}", id)))
    }

    async fn find_answer(&mut self, id: &ObjectId) -> Result<Option<AnswerInfo>, DomainError> {
        let result = answer::Entity::find_by_id(id.0.clone())
            .one(&self.tx)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn set_accepted_answer(
        &mut self,
        question_id: &ObjectId,
        answer_id: Option<&ObjectId>,
    ) -> Result<(), DomainError> {
        let result = question::Entity::update_many()
            .col_expr(
                question::Column::AcceptedAnswerId,
                Expr::value(answer_id.map(|a| a.0.clone())),
            )
            .filter(question::Column::Id.eq(question_id.as_str()))
            .exec(&self.tx)
            .await?;

        ensure_updated(result.rows_affected, format_args!("Question {}", question_id))
    }

    async fn set_answer_adopted(
        &mut self,
        answer_id: &ObjectId,
        adopted: bool,
    ) -> Result<(), DomainError> {
        let result = answer::Entity::update_many()
            .col_expr(answer::Column::Adopted, Expr::value(adopted))
            .filter(answer::Column::Id.eq(answer_id.as_str()))
            .exec(&self.tx)
            .await?;

        ensure_updated(result.rows_affected, format_args!("Answer {}", answer_id))
    }

    async fn list_answer_ids(
        &mut self,
        question_id: &ObjectId,
    ) -> Result<Vec<ObjectId>, DomainError> {
        let ids: Vec<String> = answer::Entity::find()
            .select_only()
            .column(answer::Column::Id)
            .filter(answer::Column::QuestionId.eq(question_id.as_str()))
            .order_by_asc(answer::Column::Id)
            .into_tuple()
            .all(&self.tx)
            .await?;

        Ok(ids.into_iter().map(ObjectId).collect())
    }
}
