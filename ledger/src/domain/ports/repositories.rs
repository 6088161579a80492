//! Repository port traits
//!
//! These traits define the interface for data persistence. Every method runs
//! on an open transaction, so the repositories are implemented by the
//! transaction type of a [`LedgerStore`] rather than by pooled connections.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    Activity, ActivityId, AnswerInfo, NewActivity, ObjectId, QuestionInfo, UserId, VoteTarget,
};
use crate::error::DomainError;

/// Activity ledger records
#[async_trait]
pub trait ActivityRepository: Send {
    /// Find the record for a tuple, preferring the active one over cancelled ones.
    /// A `None` trigger only matches self-triggered records.
    async fn find_activity(
        &mut self,
        object_id: &ObjectId,
        user_id: &UserId,
        activity_type: i32,
        trigger_user_id: Option<&UserId>,
    ) -> Result<Option<Activity>, DomainError>;

    /// Insert a new active record
    async fn create_activity(&mut self, activity: &NewActivity) -> Result<Activity, DomainError>;

    /// Mark a record cancelled. Returns false if it was already cancelled.
    async fn cancel_activity(&mut self, id: &ActivityId) -> Result<bool, DomainError>;

    /// Mark a record active again. Returns false if it was already active.
    async fn enable_activity(&mut self, id: &ActivityId) -> Result<bool, DomainError>;

    /// Overwrite the stored rank of a record
    async fn update_activity_rank(
        &mut self,
        id: &ActivityId,
        rank: i32,
        has_rank: bool,
    ) -> Result<(), DomainError>;

    /// All active, rank-bearing records for an object
    async fn list_rank_bearing_active(
        &mut self,
        object_id: &ObjectId,
    ) -> Result<Vec<Activity>, DomainError>;

    /// Sum of positive rank over a user's active, rank-bearing records updated
    /// since `since`, ignoring the excluded activity types
    async fn sum_rank_since(
        &mut self,
        user_id: &UserId,
        since: DateTime<Utc>,
        excluded_types: &[i32],
    ) -> Result<i64, DomainError>;

    /// Number of active records of a type on an object
    async fn count_active(
        &mut self,
        object_id: &ObjectId,
        activity_type: i32,
    ) -> Result<i64, DomainError>;
}

/// User rank counters
#[async_trait]
pub trait UserRankRepository: Send {
    /// Lock the given user rows for the rest of the transaction.
    /// Fails with NotFound if any user does not exist.
    async fn lock_users(&mut self, user_ids: &[UserId]) -> Result<(), DomainError>;

    /// Current rank of a user
    async fn find_user_rank(&mut self, user_id: &UserId) -> Result<i32, DomainError>;

    /// Overwrite the rank of a user
    async fn update_user_rank(&mut self, user_id: &UserId, rank: i32) -> Result<(), DomainError>;
}

/// Question/answer/comment state touched by the ledger workflows
#[async_trait]
pub trait ContentRepository: Send {
    /// Add `delta` to the target's vote_count
    async fn adjust_vote_count(&mut self, target: &VoteTarget, delta: i64)
        -> Result<(), DomainError>;

    /// Current vote_count of the target
    async fn find_vote_count(&mut self, target: &VoteTarget) -> Result<i64, DomainError>;

    async fn find_question(&mut self, id: &ObjectId) -> Result<Option<QuestionInfo>, DomainError>;

    /// Lock the question row for the rest of the transaction and return it.
    /// Taken before any user lock.
    async fn lock_question(&mut self, id: &ObjectId) -> Result<QuestionInfo, DomainError>;

    async fn find_answer(&mut self, id: &ObjectId) -> Result<Option<AnswerInfo>, DomainError>;

    /// Point the question at its accepted answer (or clear it)
    async fn set_accepted_answer(
        &mut self,
        question_id: &ObjectId,
        answer_id: Option<&ObjectId>,
    ) -> Result<(), DomainError>;

    /// Flip the adopted flag of an answer
    async fn set_answer_adopted(
        &mut self,
        answer_id: &ObjectId,
        adopted: bool,
    ) -> Result<(), DomainError>;

    /// Ids of every answer to a question
    async fn list_answer_ids(&mut self, question_id: &ObjectId)
        -> Result<Vec<ObjectId>, DomainError>;
}

/// One open transaction over the ledger's storage
#[async_trait]
pub trait LedgerTransaction:
    ActivityRepository + UserRankRepository + ContentRepository + Send
{
    async fn commit(self) -> Result<(), DomainError>;

    async fn rollback(self) -> Result<(), DomainError>;
}

/// Transactional store; each logical action runs in exactly one transaction
#[async_trait]
pub trait LedgerStore: Send + Sync {
    type Tx: LedgerTransaction;

    async fn begin(&self) -> Result<Self::Tx, DomainError>;
}
