//! Notification dispatchers
//!
//! Both dispatchers are fire-and-forget; neither can fail the caller.

use tokio::sync::mpsc;

use crate::domain::entities::ReputationEvent;
use crate::domain::ports::NotificationDispatcher;

/// Writes each event to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationDispatcher;

impl NotificationDispatcher for LogNotificationDispatcher {
    fn send(&self, event: ReputationEvent) {
        tracing::info!(
            kind = %event.kind,
            user_id = %event.user_id,
            trigger_user_id = ?event.trigger_user_id.as_ref().map(|u| u.as_str()),
            object_id = %event.object_id,
            rank_delta = event.rank_delta,
            "Reputation event"
        );
    }
}

/// Pushes events onto an unbounded channel for a downstream consumer
#[derive(Debug, Clone)]
pub struct ChannelNotificationDispatcher {
    tx: mpsc::UnboundedSender<ReputationEvent>,
}

impl ChannelNotificationDispatcher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ReputationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationDispatcher for ChannelNotificationDispatcher {
    fn send(&self, event: ReputationEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::warn!(
                kind = %e.0.kind,
                user_id = %e.0.user_id,
                "Notification receiver gone, event dropped"
            );
        }
    }
}
