//! Account activation credit

use std::sync::Arc;

use crate::app::activity_ledger::{ActivityLedger, AwardOutcome, AwardRequest};
use crate::app::activity_type_resolver::ActivityTypeResolver;
use crate::app::transaction::{dispatch, finish, lock_participants};
use crate::domain::entities::{
    ObjectId, ObjectType, ReputationEvent, ReputationEventKind, ResolvedActivity, UserId,
};
use crate::domain::ports::{ConfigProvider, LedgerStore, NotificationDispatcher, ObjectClassifier};
use crate::error::DomainError;

const ACTIVATED_ACTION: &str = "activated";

pub struct UserActivationService<S, C, K, N>
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

impl<S, C, K, N> UserActivationService<S, C, K, N>
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

    /// Credit `user.activated` once per user. Returns the rank credited.
    pub async fn activate(&self, user_id: &UserId) -> Result<i32, DomainError> {
        let resolved = self
            .resolver
            .resolve_for_type(ObjectType::User, ACTIVATED_ACTION)?;
        let object_id = ObjectId::from(user_id.as_str());

        let mut tx = self.store.begin().await?;
        let result = self
            .activate_in_tx(&mut tx, user_id, &object_id, resolved)
            .await;
        let outcome = finish(tx, result).await?;

        if let AwardOutcome::AlreadyActive(_) = outcome {
            tracing::debug!(user_id = %user_id, "User already activated");
            return Ok(0);
        }

        let credited = outcome.rank_delta();
        tracing::info!(user_id = %user_id, credited = credited, "User activated");
        dispatch(
            self.notifier.as_ref(),
            vec![ReputationEvent {
                kind: ReputationEventKind::UserActivated,
                user_id: user_id.clone(),
                trigger_user_id: None,
                object_id,
                rank_delta: credited,
            }],
        );
        Ok(credited)
    }

    async fn activate_in_tx(
        &self,
        tx: &mut S::Tx,
        user_id: &UserId,
        object_id: &ObjectId,
        resolved: ResolvedActivity,
    ) -> Result<AwardOutcome, DomainError> {
        lock_participants(tx, &[user_id]).await?;
        self.ledger
            .award(
                tx,
                AwardRequest {
                    user_id: user_id.clone(),
                    trigger_user_id: None,
                    object_id: object_id.clone(),
                    original_object_id: object_id.clone(),
                    resolved,
                },
            )
            .await
    }
}
