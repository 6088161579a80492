//! Direct rank adjustments
//!
//! For flows that move a user's rank outside the activity ledger, such as a
//! reviewer approving an edit. No daily cap applies; the floor does.

use std::sync::Arc;

use crate::app::rank_mutator::RankMutator;
use crate::app::transaction::{finish, lock_participants};
use crate::domain::entities::{RankChange, UserId};
use crate::domain::ports::{ConfigProvider, LedgerStore, UserRankRepository};
use crate::error::DomainError;

pub struct RankAdjustmentService<S, C>
where
    S: LedgerStore,
    C: ConfigProvider,
{
    store: Arc<S>,
    mutator: RankMutator<C>,
}

impl<S, C> RankAdjustmentService<S, C>
where
    S: LedgerStore,
    C: ConfigProvider,
{
    pub fn new(store: Arc<S>, config: Arc<C>) -> Self {
        Self {
            store,
            mutator: RankMutator::new(config),
        }
    }

    /// Add `delta` to the user's rank, clamped at the floor
    pub async fn adjust_absolute(
        &self,
        user_id: &UserId,
        delta: i32,
    ) -> Result<RankChange, DomainError> {
        let mut tx = self.store.begin().await?;
        let result = self.adjust_in_tx(&mut tx, user_id, delta).await;
        let change = finish(tx, result).await?;

        tracing::info!(
            user_id = %user_id,
            delta = delta,
            applied = change.applied(),
            "Rank adjusted"
        );
        Ok(change)
    }

    async fn adjust_in_tx(
        &self,
        tx: &mut S::Tx,
        user_id: &UserId,
        delta: i32,
    ) -> Result<RankChange, DomainError> {
        lock_participants(tx, &[user_id]).await?;
        let current = tx.find_user_rank(user_id).await?;
        self.mutator
            .change_by_absolute(tx, user_id, current, delta)
            .await
    }
}
