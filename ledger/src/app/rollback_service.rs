//! Cascade rollback
//!
//! When a question or answer is deleted every rank-bearing activity tied to
//! it is revoked. Deleting a question also revokes what its answers earned.
//! The whole cascade is one transaction: either everything is reversed or
//! nothing is.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;

use crate::app::activity_ledger::ActivityLedger;
use crate::app::activity_type_resolver::ActivityTypeResolver;
use crate::app::transaction::{dispatch, finish, lock_participants};
use crate::domain::entities::{
    Activity, ObjectId, ObjectType, ReputationEvent, ReputationEventKind, UserId,
};
use crate::domain::ports::{
    ActivityRepository, ConfigProvider, ContentRepository, LedgerStore, NotificationDispatcher,
    ObjectClassifier,
};
use crate::error::DomainError;

/// What a rollback reversed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackSummary {
    pub object_id: ObjectId,
    /// Number of activities cancelled
    pub cancelled: usize,
    /// Net rank change per affected user
    pub rank_deltas: BTreeMap<UserId, i32>,
}

pub struct RollbackService<S, C, K, N>
where
    S: LedgerStore,
    C: ConfigProvider,
    K: ObjectClassifier,
    N: NotificationDispatcher,
{
    store: Arc<S>,
    resolver: ActivityTypeResolver<C, K>,
    ledger: ActivityLedger<C>,
    notifier: Arc<N>,
}

impl<S, C, K, N> RollbackService<S, C, K, N>
where
    S: LedgerStore,
    C: ConfigProvider,
    K: ObjectClassifier,
    N: NotificationDispatcher,
{
    pub fn new(store: Arc<S>, config: Arc<C>, classifier: Arc<K>, notifier: Arc<N>) -> Self {
        Self {
            store,
            resolver: ActivityTypeResolver::new(config.clone(), classifier),
            ledger: ActivityLedger::new(config),
            notifier,
        }
    }

    /// Revoke everything `object_id` (and, for a question, its answers) earned.
    /// Running it again finds nothing left to revoke.
    pub async fn rollback_object(
        &self,
        object_id: &ObjectId,
    ) -> Result<RollbackSummary, DomainError> {
        let object_type = self.resolver.classify(object_id)?;

        let mut tx = self.store.begin().await?;
        let result = self.rollback_in_tx(&mut tx, object_id, object_type).await;
        let summary = finish(tx, result).await?;

        tracing::info!(
            object_id = %object_id,
            object_type = %object_type,
            cancelled = summary.cancelled,
            users = summary.rank_deltas.len(),
            "Object rolled back"
        );

        let events = summary
            .rank_deltas
            .iter()
            .map(|(user_id, delta)| ReputationEvent {
                kind: ReputationEventKind::ObjectRolledBack,
                user_id: user_id.clone(),
                trigger_user_id: None,
                object_id: object_id.clone(),
                rank_delta: *delta,
            })
            .collect();
        dispatch(self.notifier.as_ref(), events);

        Ok(summary)
    }

    async fn rollback_in_tx(
        &self,
        tx: &mut S::Tx,
        object_id: &ObjectId,
        object_type: ObjectType,
    ) -> Result<RollbackSummary, DomainError> {
        let mut objects = vec![object_id.clone()];
        if object_type == ObjectType::Question {
            objects.extend(tx.list_answer_ids(object_id).await?);
        }

        // Rows listed before the users were locked may have changed since;
        // list again under the locks and lock anyone new.
        let listed = Self::list_activities(tx, &objects).await?;
        let locked: BTreeSet<UserId> = listed.into_iter().map(|a| a.user_id).collect();
        lock_participants(tx, &locked.iter().collect::<Vec<_>>()).await?;

        let activities = Self::list_activities(tx, &objects).await?;
        let late: Vec<&UserId> = activities
            .iter()
            .map(|a| &a.user_id)
            .filter(|u| !locked.contains(*u))
            .collect();
        if !late.is_empty() {
            lock_participants(tx, &late).await?;
        }

        let mut summary = RollbackSummary {
            object_id: object_id.clone(),
            cancelled: 0,
            rank_deltas: BTreeMap::new(),
        };

        for activity in &activities {
            let change = self.ledger.revoke(tx, activity).await?;
            summary.cancelled += 1;
            *summary
                .rank_deltas
                .entry(activity.user_id.clone())
                .or_insert(0) += change.applied();
        }

        Ok(summary)
    }

    async fn list_activities(
        tx: &mut S::Tx,
        objects: &[ObjectId],
    ) -> Result<Vec<Activity>, DomainError> {
        let mut activities = Vec::new();
        for object in objects {
            activities.extend(tx.list_rank_bearing_active(object).await?);
        }
        Ok(activities)
    }
}
