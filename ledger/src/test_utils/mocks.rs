//! In-memory implementations of port traits
//!
//! `InMemoryLedgerStore` hands out transactions that work on a private copy
//! of the store's state. Commit writes the copy back; rollback (or drop)
//! discards it. Only one transaction is open at a time, which stands in for
//! the user row locks of the real store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::entities::{
    Activity, ActivityId, AnswerInfo, NewActivity, ObjectId, ObjectType, QuestionInfo,
    ReputationEvent, UserId, VoteTarget,
};
use crate::domain::ports::{
    ActivityRepository, ContentRepository, LedgerStore, LedgerTransaction, NotificationDispatcher,
    UserRankRepository,
};
use crate::error::DomainError;

// ============================================================================
// In-Memory Ledger Store
// ============================================================================

/// `question.voted_up` in the default configuration
const EARNINGS_ACTIVITY_TYPE: i32 = 2;

fn earnings_object() -> ObjectId {
    ObjectId::generate(ObjectType::Question, 9_999_999)
}

#[derive(Debug, Clone)]
struct CommentRow {
    user_id: UserId,
    vote_count: i64,
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    users: BTreeMap<UserId, i32>,
    activities: Vec<Activity>,
    questions: BTreeMap<ObjectId, QuestionInfo>,
    answers: BTreeMap<ObjectId, AnswerInfo>,
    comments: BTreeMap<ObjectId, CommentRow>,
}

#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<AsyncMutex<LedgerState>>,
    /// Writes the next transaction may perform before failing
    fail_after: Arc<Mutex<Option<usize>>>,
    commits: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn seed(&self, f: impl FnOnce(&mut LedgerState)) {
        let mut state = self
            .state
            .try_lock()
            .expect("store is not seeded while a transaction is open");
        f(&mut state);
    }

    /// Pre-populate with a user
    pub fn with_user(self, id: &str, rank: i32) -> Self {
        self.seed(|s| {
            s.users.insert(UserId::from(id), rank);
        });
        self
    }

    pub fn with_question(self, id: ObjectId, owner: &str) -> Self {
        self.seed(|s| {
            s.questions.insert(
                id.clone(),
                QuestionInfo {
                    id,
                    user_id: UserId::from(owner),
                    vote_count: 0,
                    accepted_answer_id: None,
                },
            );
        });
        self
    }

    pub fn with_answer(self, id: ObjectId, question_id: ObjectId, owner: &str) -> Self {
        self.seed(|s| {
            s.answers.insert(
                id.clone(),
                AnswerInfo {
                    id,
                    question_id,
                    user_id: UserId::from(owner),
                    vote_count: 0,
                    adopted: false,
                },
            );
        });
        self
    }

    pub fn with_comment(self, id: ObjectId, owner: &str) -> Self {
        self.seed(|s| {
            s.comments.insert(
                id,
                CommentRow {
                    user_id: UserId::from(owner),
                    vote_count: 0,
                },
            );
        });
        self
    }

    /// Make the next transaction fail with a storage error after `writes`
    /// successful writes
    pub async fn fail_after_writes(&self, writes: usize) {
        *self.fail_after.lock().unwrap() = Some(writes);
    }

    /// Record `amount` of rank already earned today by `user_id`.
    /// The record is hidden from `all_activities`.
    pub async fn seed_daily_earnings(&self, user_id: &UserId, amount: i32) {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        state.activities.push(Activity {
            id: ActivityId::new(),
            user_id: user_id.clone(),
            trigger_user_id: None,
            object_id: earnings_object(),
            original_object_id: earnings_object(),
            activity_type: EARNINGS_ACTIVITY_TYPE,
            rank: amount,
            has_rank: true,
            cancelled: false,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        });
    }

    pub async fn user_rank(&self, user_id: &UserId) -> Option<i32> {
        self.state.lock().await.users.get(user_id).copied()
    }

    pub async fn set_user_rank(&self, user_id: &UserId, rank: i32) {
        self.state.lock().await.users.insert(user_id.clone(), rank);
    }

    pub async fn all_activities(&self) -> Vec<Activity> {
        let state = self.state.lock().await;
        state
            .activities
            .iter()
            .filter(|a| a.object_id != earnings_object())
            .cloned()
            .collect()
    }

    pub async fn active_activities(&self, object_id: &ObjectId) -> Vec<Activity> {
        let state = self.state.lock().await;
        state
            .activities
            .iter()
            .filter(|a| &a.object_id == object_id && a.is_active())
            .cloned()
            .collect()
    }

    pub async fn question(&self, id: &ObjectId) -> Option<QuestionInfo> {
        self.state.lock().await.questions.get(id).cloned()
    }

    pub async fn answer(&self, id: &ObjectId) -> Option<AnswerInfo> {
        self.state.lock().await.answers.get(id).cloned()
    }

    /// vote_count of whichever question, answer or comment has this id
    pub async fn vote_count(&self, id: &ObjectId) -> Option<i64> {
        let state = self.state.lock().await;
        state
            .questions
            .get(id)
            .map(|q| q.vote_count)
            .or_else(|| state.answers.get(id).map(|a| a.vote_count))
            .or_else(|| state.comments.get(id).map(|c| c.vote_count))
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    type Tx = InMemoryLedgerTransaction;

    async fn begin(&self) -> Result<Self::Tx, DomainError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        let writes_left = self.fail_after.lock().unwrap().take();

        Ok(InMemoryLedgerTransaction {
            guard,
            working,
            writes_left,
            commits: self.commits.clone(),
            rollbacks: self.rollbacks.clone(),
        })
    }
}

pub struct InMemoryLedgerTransaction {
    guard: OwnedMutexGuard<LedgerState>,
    working: LedgerState,
    writes_left: Option<usize>,
    commits: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl InMemoryLedgerTransaction {
    fn write(&mut self) -> Result<(), DomainError> {
        if let Some(left) = self.writes_left.as_mut() {
            if *left == 0 {
                return Err(DomainError::Storage("injected write failure".to_string()));
            }
            *left -= 1;
        }
        Ok(())
    }

    fn activity_mut(&mut self, id: &ActivityId) -> Result<&mut Activity, DomainError> {
        self.working
            .activities
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Activity {}", id)))
    }

    fn vote_count_mut(&mut self, target: &VoteTarget) -> Result<&mut i64, DomainError> {
        let id = target.object_id();
        let count = match target {
            VoteTarget::Question(_) => self.working.questions.get_mut(id).map(|q| &mut q.vote_count),
            VoteTarget::Answer(_) => self.working.answers.get_mut(id).map(|a| &mut a.vote_count),
            VoteTarget::Comment(_) => self.working.comments.get_mut(id).map(|c| &mut c.vote_count),
        };
        count.ok_or_else(|| DomainError::NotFound(format!("{} {}", target.object_type(), id)))
    }
}

#[async_trait]
impl LedgerTransaction for InMemoryLedgerTransaction {
    async fn commit(mut self) -> Result<(), DomainError> {
        *self.guard = std::mem::take(&mut self.working);
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ActivityRepository for InMemoryLedgerTransaction {
    async fn find_activity(
        &mut self,
        object_id: &ObjectId,
        user_id: &UserId,
        activity_type: i32,
        trigger_user_id: Option<&UserId>,
    ) -> Result<Option<Activity>, DomainError> {
        Ok(self
            .working
            .activities
            .iter()
            .filter(|a| {
                &a.object_id == object_id
                    && &a.user_id == user_id
                    && a.activity_type == activity_type
                    && a.trigger_user_id.as_ref() == trigger_user_id
            })
            .max_by_key(|a| (a.is_active(), a.updated_at))
            .cloned())
    }

    async fn create_activity(&mut self, new: &NewActivity) -> Result<Activity, DomainError> {
        let duplicate = self.working.activities.iter().any(|a| {
            a.is_active()
                && a.object_id == new.object_id
                && a.user_id == new.user_id
                && a.activity_type == new.activity_type
                && a.trigger_user_id == new.trigger_user_id
        });
        if duplicate {
            return Err(DomainError::Conflict(format!(
                "active activity exists for {} / {}",
                new.object_id, new.user_id
            )));
        }
        self.write()?;

        let now = Utc::now();
        let activity = Activity {
            id: ActivityId::new(),
            user_id: new.user_id.clone(),
            trigger_user_id: new.trigger_user_id.clone(),
            object_id: new.object_id.clone(),
            original_object_id: new.original_object_id.clone(),
            activity_type: new.activity_type,
            rank: new.rank,
            has_rank: new.has_rank,
            cancelled: false,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        };
        self.working.activities.push(activity.clone());
        Ok(activity)
    }

    async fn cancel_activity(&mut self, id: &ActivityId) -> Result<bool, DomainError> {
        self.write()?;
        let activity = self.activity_mut(id)?;
        if activity.cancelled {
            return Ok(false);
        }
        let now = Utc::now();
        activity.cancelled = true;
        activity.cancelled_at = Some(now);
        activity.updated_at = now;
        Ok(true)
    }

    async fn enable_activity(&mut self, id: &ActivityId) -> Result<bool, DomainError> {
        self.write()?;
        let activity = self.activity_mut(id)?;
        if !activity.cancelled {
            return Ok(false);
        }
        activity.cancelled = false;
        activity.cancelled_at = None;
        activity.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_activity_rank(
        &mut self,
        id: &ActivityId,
        rank: i32,
        has_rank: bool,
    ) -> Result<(), DomainError> {
        self.write()?;
        let activity = self.activity_mut(id)?;
        activity.rank = rank;
        activity.has_rank = has_rank;
        activity.updated_at = Utc::now();
        Ok(())
    }

    async fn list_rank_bearing_active(
        &mut self,
        object_id: &ObjectId,
    ) -> Result<Vec<Activity>, DomainError> {
        Ok(self
            .working
            .activities
            .iter()
            .filter(|a| &a.object_id == object_id && a.is_active() && a.has_rank)
            .cloned()
            .collect())
    }

    async fn sum_rank_since(
        &mut self,
        user_id: &UserId,
        since: DateTime<Utc>,
        excluded_types: &[i32],
    ) -> Result<i64, DomainError> {
        Ok(self
            .working
            .activities
            .iter()
            .filter(|a| {
                &a.user_id == user_id
                    && a.is_active()
                    && a.has_rank
                    && a.rank > 0
                    && a.updated_at >= since
                    && !excluded_types.contains(&a.activity_type)
            })
            .map(|a| i64::from(a.rank))
            .sum())
    }

    async fn count_active(
        &mut self,
        object_id: &ObjectId,
        activity_type: i32,
    ) -> Result<i64, DomainError> {
        Ok(self
            .working
            .activities
            .iter()
            .filter(|a| {
                &a.object_id == object_id && a.activity_type == activity_type && a.is_active()
            })
            .count() as i64)
    }
}

#[async_trait]
impl UserRankRepository for InMemoryLedgerTransaction {
    async fn lock_users(&mut self, user_ids: &[UserId]) -> Result<(), DomainError> {
        match user_ids
            .iter()
            .find(|u| !self.working.users.contains_key(*u))
        {
            Some(missing) => Err(DomainError::NotFound(format!("User {}", missing))),
            None => Ok(()),
        }
    }

    async fn find_user_rank(&mut self, user_id: &UserId) -> Result<i32, DomainError> {
        self.working
            .users
            .get(user_id)
            .copied()
            .ok_or_else(|| DomainError::NotFound(format!("User {}", user_id)))
    }

    async fn update_user_rank(&mut self, user_id: &UserId, rank: i32) -> Result<(), DomainError> {
        self.write()?;
        let current = self
            .working
            .users
            .get_mut(user_id)
            .ok_or_else(|| DomainError::NotFound(format!("User {}", user_id)))?;
        *current = rank;
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for InMemoryLedgerTransaction {
    async fn adjust_vote_count(
        &mut self,
        target: &VoteTarget,
        delta: i64,
    ) -> Result<(), DomainError> {
        self.write()?;
        *self.vote_count_mut(target)? += delta;
        Ok(())
    }

    async fn find_vote_count(&mut self, target: &VoteTarget) -> Result<i64, DomainError> {
        Ok(*self.vote_count_mut(target)?)
    }

    async fn find_question(&mut self, id: &ObjectId) -> Result<Option<QuestionInfo>, DomainError> {
        Ok(self.working.questions.get(id).cloned())
    }

    async fn lock_question(&mut self, id: &ObjectId) -> Result<QuestionInfo, DomainError> {
        self.working
            .questions
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("Question {}", id)))
    }

    async fn find_answer(&mut self, id: &ObjectId) -> Result<Option<AnswerInfo>, DomainError> {
        Ok(self.working.answers.get(id).cloned())
    }

    async fn set_accepted_answer(
        &mut self,
        question_id: &ObjectId,
        answer_id: Option<&ObjectId>,
    ) -> Result<(), DomainError> {
        self.write()?;
        let question = self
            .working
            .questions
            .get_mut(question_id)
            .ok_or_else(|| DomainError::NotFound(format!("Question {}", question_id)))?;
        question.accepted_answer_id = answer_id.cloned();
        Ok(())
    }

    async fn set_answer_adopted(
        &mut self,
        answer_id: &ObjectId,
        adopted: bool,
    ) -> Result<(), DomainError> {
        self.write()?;
        let answer = self
            .working
            .answers
            .get_mut(answer_id)
            .ok_or_else(|| DomainError::NotFound(format!("Answer {}", answer_id)))?;
        answer.adopted = adopted;
        Ok(())
    }

    async fn list_answer_ids(
        &mut self,
        question_id: &ObjectId,
    ) -> Result<Vec<ObjectId>, DomainError> {
        Ok(self
            .working
            .answers
            .values()
            .filter(|a| &a.question_id == question_id)
            .map(|a| a.id.clone())
            .collect())
    }
}

// ============================================================================
// Recording Notification Dispatcher
// ============================================================================

#[derive(Default)]
pub struct RecordingNotificationDispatcher {
    events: Mutex<Vec<ReputationEvent>>,
}

impl RecordingNotificationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReputationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationDispatcher for RecordingNotificationDispatcher {
    fn send(&self, event: ReputationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rollback_discards_writes() {
        let store = InMemoryLedgerStore::new().with_user("1", 10);

        let mut tx = store.begin().await.unwrap();
        tx.update_user_rank(&UserId::from("1"), 99).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.user_rank(&UserId::from("1")).await, Some(10));
        assert_eq!(store.rollbacks(), 1);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = InMemoryLedgerStore::new().with_user("1", 10);

        {
            let mut tx = store.begin().await.unwrap();
            tx.update_user_rank(&UserId::from("1"), 99).await.unwrap();
        }

        assert_eq!(store.user_rank(&UserId::from("1")).await, Some(10));
    }

    #[tokio::test]
    async fn commit_publishes_writes() {
        let store = InMemoryLedgerStore::new().with_user("1", 10);

        let mut tx = store.begin().await.unwrap();
        tx.update_user_rank(&UserId::from("1"), 99).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.user_rank(&UserId::from("1")).await, Some(99));
        assert_eq!(store.commits(), 1);
    }

    #[tokio::test]
    async fn injected_failure_hits_only_next_transaction() {
        let store = InMemoryLedgerStore::new().with_user("1", 10);
        store.fail_after_writes(0).await;

        let mut tx = store.begin().await.unwrap();
        assert!(tx.update_user_rank(&UserId::from("1"), 5).await.is_err());
        drop(tx);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.update_user_rank(&UserId::from("1"), 5).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_active_tuple_conflicts() {
        let store = InMemoryLedgerStore::new();
        let mut tx = store.begin().await.unwrap();
        let new = NewActivity {
            user_id: UserId::from("1"),
            trigger_user_id: None,
            object_id: ObjectId::generate(ObjectType::Answer, 1),
            original_object_id: ObjectId::generate(ObjectType::Question, 1),
            activity_type: 5,
            rank: 0,
            has_rank: false,
        };

        tx.create_activity(&new).await.unwrap();
        assert!(matches!(
            tx.create_activity(&new).await,
            Err(DomainError::Conflict(_))
        ));
    }
}
