//! Object identifiers and types
//!
//! Object ids are strings of the form `1` + 3-digit type code + 13-digit
//! sequence, e.g. `10020000000000001` is answer #1. The type code is what the
//! object classifier decodes.

use serde::{Deserialize, Serialize};

/// Identifier of a question, answer, comment, tag or user object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub String);

impl ObjectId {
    /// Build an id for the given type and sequence number
    pub fn generate(object_type: ObjectType, seq: u64) -> Self {
        Self(format!("1{:03}{:013}", object_type.code(), seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Type code embedded at positions 1..4, if the id is well formed
    pub fn type_code(&self) -> Option<u16> {
        let digits = self.0.get(1..4)?;
        if !self.0.starts_with('1') || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Semantic type of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Question,
    Answer,
    Tag,
    User,
    Comment,
}

impl ObjectType {
    pub fn code(&self) -> u16 {
        match self {
            ObjectType::Question => 1,
            ObjectType::Answer => 2,
            ObjectType::Tag => 3,
            ObjectType::User => 4,
            ObjectType::Comment => 5,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(ObjectType::Question),
            2 => Some(ObjectType::Answer),
            3 => Some(ObjectType::Tag),
            4 => Some(ObjectType::User),
            5 => Some(ObjectType::Comment),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectType::Question => write!(f, "question"),
            ObjectType::Answer => write!(f, "answer"),
            ObjectType::Tag => write!(f, "tag"),
            ObjectType::User => write!(f, "user"),
            ObjectType::Comment => write!(f, "comment"),
        }
    }
}

impl std::str::FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "question" => Ok(ObjectType::Question),
            "answer" => Ok(ObjectType::Answer),
            "tag" => Ok(ObjectType::Tag),
            "user" => Ok(ObjectType::User),
            "comment" => Ok(ObjectType::Comment),
            _ => Err(format!("Unknown object type: {}", s)),
        }
    }
}

/// Question row as seen by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionInfo {
    pub id: ObjectId,
    pub user_id: super::UserId,
    pub vote_count: i64,
    pub accepted_answer_id: Option<ObjectId>,
}

/// Answer row as seen by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerInfo {
    pub id: ObjectId,
    pub question_id: ObjectId,
    pub user_id: super::UserId,
    pub vote_count: i64,
    pub adopted: bool,
}
