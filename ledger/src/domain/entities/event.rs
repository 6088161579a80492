//! Reputation events handed to the notification dispatcher after commit

use serde::Serialize;

use super::object::ObjectId;
use super::user::UserId;
use super::vote::VoteDirection;

/// Kind of event a downstream notifier may want to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationEventKind {
    Voted(VoteDirection),
    VoteCancelled(VoteDirection),
    AnswerAccepted,
    AcceptCancelled,
    ObjectRolledBack,
    UserActivated,
}

impl std::fmt::Display for ReputationEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReputationEventKind::Voted(direction) => write!(f, "voted_{}", direction),
            ReputationEventKind::VoteCancelled(direction) => {
                write!(f, "vote_{}_cancelled", direction)
            }
            ReputationEventKind::AnswerAccepted => write!(f, "answer_accepted"),
            ReputationEventKind::AcceptCancelled => write!(f, "accept_cancelled"),
            ReputationEventKind::ObjectRolledBack => write!(f, "object_rolled_back"),
            ReputationEventKind::UserActivated => write!(f, "user_activated"),
        }
    }
}

/// A committed reputation change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReputationEvent {
    pub kind: ReputationEventKind,
    /// User the event is about (receiver of the notification)
    pub user_id: UserId,
    pub trigger_user_id: Option<UserId>,
    pub object_id: ObjectId,
    /// Net rank change for `user_id`
    pub rank_delta: i32,
}
