//! Notification port
//!
//! Dispatch is fire-and-forget: callers invoke it only after their
//! transaction has committed and never wait on the outcome.

use crate::domain::entities::ReputationEvent;

pub trait NotificationDispatcher: Send + Sync {
    fn send(&self, event: ReputationEvent);
}
