//! Object classification port

use crate::domain::entities::{ObjectId, ObjectType};
use crate::error::DomainError;

/// Derives the semantic type of an object from its id
#[cfg_attr(test, mockall::automock)]
pub trait ObjectClassifier: Send + Sync {
    fn classify(&self, object_id: &ObjectId) -> Result<ObjectType, DomainError>;
}
