//! Activity ledger
//!
//! Owns the two record-level steps every workflow is built from:
//! - `award`: find-or-create an activity and credit its rank, or re-enable a
//!   cancelled one and credit it again
//! - `revoke`: reverse the stored rank and cancel the record
//!
//! Records are only ever toggled. The rank stored on a record is what was
//! actually credited, so a revoke restores the counter exactly.

use std::sync::Arc;

use crate::app::rank_mutator::RankMutator;
use crate::domain::entities::{
    is_self_triggered, Activity, NewActivity, ObjectId, RankChange, ResolvedActivity, UserId,
};
use crate::domain::ports::{ConfigProvider, LedgerTransaction};
use crate::error::DomainError;

/// One award to apply inside a workflow
#[derive(Debug, Clone)]
pub struct AwardRequest {
    /// User credited by the activity
    pub user_id: UserId,
    /// User who caused it
    pub trigger_user_id: Option<UserId>,
    pub object_id: ObjectId,
    pub original_object_id: ObjectId,
    pub resolved: ResolvedActivity,
}

impl AwardRequest {
    /// Self-triggered awards carry no rank and no trigger user
    fn normalized(self) -> Self {
        if is_self_triggered(&self.user_id, self.trigger_user_id.as_ref()) {
            Self {
                trigger_user_id: None,
                resolved: self.resolved.without_rank(),
                ..self
            }
        } else {
            self
        }
    }
}

/// What `award` did
#[derive(Debug, Clone, PartialEq)]
pub enum AwardOutcome {
    /// An active record already existed; nothing changed
    AlreadyActive(Activity),
    /// A cancelled record was switched back on and credited again
    Reenabled { activity: Activity, change: RankChange },
    /// A new record was created
    Created { activity: Activity, change: RankChange },
}

impl AwardOutcome {
    pub fn activity(&self) -> &Activity {
        match self {
            AwardOutcome::AlreadyActive(activity)
            | AwardOutcome::Reenabled { activity, .. }
            | AwardOutcome::Created { activity, .. } => activity,
        }
    }

    /// Whether this call made the record active
    pub fn newly_active(&self) -> bool {
        !matches!(self, AwardOutcome::AlreadyActive(_))
    }

    /// Rank credited by this call
    pub fn rank_delta(&self) -> i32 {
        match self {
            AwardOutcome::AlreadyActive(_) => 0,
            AwardOutcome::Reenabled { change, .. } | AwardOutcome::Created { change, .. } => {
                change.applied()
            }
        }
    }
}

pub struct ActivityLedger<C>
where
    C: ConfigProvider,
{
    mutator: RankMutator<C>,
}

impl<C> ActivityLedger<C>
where
    C: ConfigProvider,
{
    pub fn new(config: Arc<C>) -> Self {
        Self {
            mutator: RankMutator::new(config),
        }
    }

    pub fn mutator(&self) -> &RankMutator<C> {
        &self.mutator
    }

    /// The active record for a tuple, if any. Self-triggered tuples are
    /// looked up the way `award` stores them.
    pub async fn find_active<T>(
        &self,
        tx: &mut T,
        object_id: &ObjectId,
        user_id: &UserId,
        trigger_user_id: Option<&UserId>,
        activity_type: i32,
    ) -> Result<Option<Activity>, DomainError>
    where
        T: LedgerTransaction,
    {
        let trigger = if is_self_triggered(user_id, trigger_user_id) {
            None
        } else {
            trigger_user_id
        };

        let found = tx
            .find_activity(object_id, user_id, activity_type, trigger)
            .await?;
        Ok(found.filter(Activity::is_active))
    }

    /// Find-or-create the activity and credit its rank
    pub async fn award<T>(
        &self,
        tx: &mut T,
        request: AwardRequest,
    ) -> Result<AwardOutcome, DomainError>
    where
        T: LedgerTransaction,
    {
        let request = request.normalized();
        let resolved = request.resolved;

        let existing = tx
            .find_activity(
                &request.object_id,
                &request.user_id,
                resolved.activity_type,
                request.trigger_user_id.as_ref(),
            )
            .await?;

        match existing {
            Some(activity) if activity.is_active() => {
                tracing::debug!(
                    activity_id = %activity.id,
                    user_id = %activity.user_id,
                    activity_type = activity.activity_type,
                    "Activity already active"
                );
                Ok(AwardOutcome::AlreadyActive(activity))
            }
            Some(mut activity) => {
                let change = self
                    .credit(tx, &request.user_id, resolved)
                    .await?;
                tx.enable_activity(&activity.id).await?;
                tx.update_activity_rank(&activity.id, change.applied(), resolved.has_rank)
                    .await?;

                activity.cancelled = false;
                activity.cancelled_at = None;
                activity.rank = change.applied();
                activity.has_rank = resolved.has_rank;

                tracing::info!(
                    activity_id = %activity.id,
                    user_id = %activity.user_id,
                    activity_type = activity.activity_type,
                    rank = activity.rank,
                    "Activity re-enabled"
                );
                Ok(AwardOutcome::Reenabled { activity, change })
            }
            None => {
                let change = self
                    .credit(tx, &request.user_id, resolved)
                    .await?;
                let activity = tx
                    .create_activity(&NewActivity {
                        user_id: request.user_id,
                        trigger_user_id: request.trigger_user_id,
                        object_id: request.object_id,
                        original_object_id: request.original_object_id,
                        activity_type: resolved.activity_type,
                        rank: change.applied(),
                        has_rank: resolved.has_rank,
                    })
                    .await?;

                tracing::info!(
                    activity_id = %activity.id,
                    user_id = %activity.user_id,
                    activity_type = activity.activity_type,
                    rank = activity.rank,
                    suppressed = change.is_suppressed(),
                    "Activity created"
                );
                Ok(AwardOutcome::Created { activity, change })
            }
        }
    }

    /// Cancel the record and reverse what it credited. A record whose stored
    /// row is already cancelled is left alone, even if `activity` is a stale
    /// copy that still reads active.
    pub async fn revoke<T>(&self, tx: &mut T, activity: &Activity) -> Result<RankChange, DomainError>
    where
        T: LedgerTransaction,
    {
        if !activity.is_active() {
            return Ok(RankChange::Unchanged);
        }

        if !tx.cancel_activity(&activity.id).await? {
            tracing::debug!(activity_id = %activity.id, "Activity was already cancelled");
            return Ok(RankChange::Unchanged);
        }

        let change = if activity.carries_rank() {
            self.mutator
                .revert(tx, &activity.user_id, -activity.rank)
                .await?
        } else {
            RankChange::Unchanged
        };

        tracing::info!(
            activity_id = %activity.id,
            user_id = %activity.user_id,
            activity_type = activity.activity_type,
            reverted = change.applied(),
            "Activity revoked"
        );
        Ok(change)
    }

    async fn credit<T>(
        &self,
        tx: &mut T,
        user_id: &UserId,
        resolved: ResolvedActivity,
    ) -> Result<RankChange, DomainError>
    where
        T: LedgerTransaction,
    {
        if !resolved.has_rank {
            return Ok(RankChange::Unchanged);
        }
        self.mutator
            .apply(tx, user_id, resolved.rank, resolved.activity_type)
            .await
    }
}
