//! Object classification by id prefix

use crate::domain::entities::{ObjectId, ObjectType};
use crate::domain::ports::ObjectClassifier;
use crate::error::DomainError;

/// Reads the type code embedded in an object id (`1` + 3-digit code + sequence)
#[derive(Debug, Clone, Copy, Default)]
pub struct IdPrefixClassifier;

impl ObjectClassifier for IdPrefixClassifier {
    fn classify(&self, object_id: &ObjectId) -> Result<ObjectType, DomainError> {
        let code = object_id
            .type_code()
            .ok_or_else(|| DomainError::Validation(format!("Malformed object id: {}", object_id)))?;

        ObjectType::from_code(code).ok_or_else(|| {
            DomainError::Validation(format!("Unknown object type code {} in {}", code, object_id))
        })
    }
}
