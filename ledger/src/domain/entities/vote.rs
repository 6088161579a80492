//! Vote domain types

use serde::{Deserialize, Serialize};

use super::object::{ObjectId, ObjectType};
use crate::error::DomainError;

/// Direction of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn opposite(&self) -> Self {
        match self {
            VoteDirection::Up => VoteDirection::Down,
            VoteDirection::Down => VoteDirection::Up,
        }
    }

    /// Change applied to the object's vote_count
    pub fn sign(&self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    /// Action keyed to the voter's own marker
    pub fn voter_action(&self) -> &'static str {
        match self {
            VoteDirection::Up => "vote_up",
            VoteDirection::Down => "vote_down",
        }
    }

    /// Action keyed to the object owner's credit
    pub fn owner_action(&self) -> &'static str {
        match self {
            VoteDirection::Up => "voted_up",
            VoteDirection::Down => "voted_down",
        }
    }
}

impl std::fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteDirection::Up => write!(f, "up"),
            VoteDirection::Down => write!(f, "down"),
        }
    }
}

impl std::str::FromStr for VoteDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(VoteDirection::Up),
            "down" => Ok(VoteDirection::Down),
            _ => Err(format!("Unknown vote direction: {}", s)),
        }
    }
}

/// An object that carries a vote counter, selected once from its classified type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VoteTarget {
    Question(ObjectId),
    Answer(ObjectId),
    Comment(ObjectId),
}

impl VoteTarget {
    /// Build a target from a classified object; tags and users cannot be voted on
    pub fn new(object_id: ObjectId, object_type: ObjectType) -> Result<Self, DomainError> {
        match object_type {
            ObjectType::Question => Ok(VoteTarget::Question(object_id)),
            ObjectType::Answer => Ok(VoteTarget::Answer(object_id)),
            ObjectType::Comment => Ok(VoteTarget::Comment(object_id)),
            other => Err(DomainError::Validation(format!(
                "{} objects do not support voting",
                other
            ))),
        }
    }

    pub fn object_id(&self) -> &ObjectId {
        match self {
            VoteTarget::Question(id) | VoteTarget::Answer(id) | VoteTarget::Comment(id) => id,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            VoteTarget::Question(_) => ObjectType::Question,
            VoteTarget::Answer(_) => ObjectType::Answer,
            VoteTarget::Comment(_) => ObjectType::Comment,
        }
    }

    /// Comments only take up-votes
    pub fn supports(&self, direction: VoteDirection) -> bool {
        match self {
            VoteTarget::Comment(_) => direction == VoteDirection::Up,
            VoteTarget::Question(_) | VoteTarget::Answer(_) => true,
        }
    }
}

/// Vote state of an object after a vote operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub object_id: ObjectId,
    pub up_votes: i64,
    pub down_votes: i64,
    pub vote_count: i64,
    /// The caller's active vote on the object, if any
    pub status: Option<VoteDirection>,
}
