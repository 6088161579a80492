//! Ledger facade
//!
//! Bundles every workflow over one store, config provider, classifier and
//! notifier, the way a host application wires them at startup.

use std::sync::Arc;

use crate::app::{
    AcceptService, RankAdjustmentService, RollbackService, UserActivationService, VoteService,
};
use crate::domain::ports::{ConfigProvider, LedgerStore, NotificationDispatcher, ObjectClassifier};

/// All ledger workflows sharing the same collaborators
pub struct ReputationLedger<S, C, K, N>
where
    S: LedgerStore,
    C: ConfigProvider,
    K: ObjectClassifier,
    N: NotificationDispatcher,
{
    pub votes: Arc<VoteService<S, C, K, N>>,
    pub accepts: Arc<AcceptService<S, C, K, N>>,
    pub rollbacks: Arc<RollbackService<S, C, K, N>>,
    pub activations: Arc<UserActivationService<S, C, K, N>>,
    pub adjustments: Arc<RankAdjustmentService<S, C>>,
    pub config: Arc<C>,
}

impl<S, C, K, N> ReputationLedger<S, C, K, N>
where
    S: LedgerStore,
    C: ConfigProvider,
    K: ObjectClassifier,
    N: NotificationDispatcher,
{
    pub fn new(store: Arc<S>, config: Arc<C>, classifier: Arc<K>, notifier: Arc<N>) -> Self {
        Self {
            votes: Arc::new(VoteService::new(
                store.clone(),
                config.clone(),
                classifier.clone(),
                notifier.clone(),
            )),
            accepts: Arc::new(AcceptService::new(
                store.clone(),
                config.clone(),
                classifier.clone(),
                notifier.clone(),
            )),
            rollbacks: Arc::new(RollbackService::new(
                store.clone(),
                config.clone(),
                classifier.clone(),
                notifier.clone(),
            )),
            activations: Arc::new(UserActivationService::new(
                store.clone(),
                config.clone(),
                classifier,
                notifier,
            )),
            adjustments: Arc::new(RankAdjustmentService::new(store, config.clone())),
            config,
        }
    }
}

impl<S, C, K, N> Clone for ReputationLedger<S, C, K, N>
where
    S: LedgerStore,
    C: ConfigProvider,
    K: ObjectClassifier,
    N: NotificationDispatcher,
{
    fn clone(&self) -> Self {
        Self {
            votes: self.votes.clone(),
            accepts: self.accepts.clone(),
            rollbacks: self.rollbacks.clone(),
            activations: self.activations.clone(),
            adjustments: self.adjustments.clone(),
            config: self.config.clone(),
        }
    }
}
