//! Activity domain entity
//!
//! An activity documents the attempted rank effect of one semantic event on one
//! user. Records are toggled between active and cancelled, never removed, so
//! every rank change can be audited and reversed later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::object::ObjectId;
use super::user::UserId;

/// Unique identifier for an activity record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub Uuid);

impl ActivityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ActivityId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A ledger record of one rank-affecting (or merely tracked) event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub id: ActivityId,
    /// User whose rank this record credits or debits
    pub user_id: UserId,
    /// User who caused the event; `None` when self-triggered
    pub trigger_user_id: Option<UserId>,
    pub object_id: ObjectId,
    /// Root object (e.g. the owning question), used by cascade lookups
    pub original_object_id: ObjectId,
    pub activity_type: i32,
    /// Amount actually applied to the user's rank
    pub rank: i32,
    pub has_rank: bool,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Activity {
    pub fn is_active(&self) -> bool {
        !self.cancelled
    }

    /// Whether reversing this record would change anyone's rank
    pub fn carries_rank(&self) -> bool {
        self.has_rank && self.rank != 0
    }
}

/// Data needed to create a new activity
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user_id: UserId,
    pub trigger_user_id: Option<UserId>,
    pub object_id: ObjectId,
    pub original_object_id: ObjectId,
    pub activity_type: i32,
    pub rank: i32,
    pub has_rank: bool,
}

/// Activity type and rank amount resolved from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedActivity {
    pub activity_type: i32,
    pub rank: i32,
    pub has_rank: bool,
}

impl ResolvedActivity {
    pub fn new(activity_type: i32, rank: i32) -> Self {
        Self {
            activity_type,
            rank,
            has_rank: rank != 0,
        }
    }

    /// Same type with no reputation effect
    pub fn without_rank(self) -> Self {
        Self {
            rank: 0,
            has_rank: false,
            ..self
        }
    }
}

/// True when the credited user also caused the event
pub fn is_self_triggered(user_id: &UserId, trigger_user_id: Option<&UserId>) -> bool {
    trigger_user_id.is_some_and(|trigger| trigger == user_id)
}
