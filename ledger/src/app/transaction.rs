//! Transaction scope helpers shared by the workflows

use crate::domain::entities::{ReputationEvent, UserId};
use crate::domain::ports::{LedgerTransaction, NotificationDispatcher};
use crate::error::DomainError;

/// Commit on success, roll back on failure. The original error wins over a
/// failed rollback.
pub(crate) async fn finish<T, R>(tx: T, result: Result<R, DomainError>) -> Result<R, DomainError>
where
    T: LedgerTransaction,
{
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(
                    error = %err,
                    rollback_error = %rollback_err,
                    "Transaction rollback failed"
                );
            }
            Err(err)
        }
    }
}

/// Lock every participant's user row in id order
pub(crate) async fn lock_participants<T>(tx: &mut T, users: &[&UserId]) -> Result<(), DomainError>
where
    T: LedgerTransaction,
{
    let mut ids: Vec<UserId> = users.iter().map(|u| (*u).clone()).collect();
    ids.sort();
    ids.dedup();
    tx.lock_users(&ids).await
}

/// Hand committed events to the dispatcher
pub(crate) fn dispatch<N>(notifier: &N, events: Vec<ReputationEvent>)
where
    N: NotificationDispatcher + ?Sized,
{
    for event in events {
        notifier.send(event);
    }
}
