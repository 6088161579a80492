//! Activity type resolution
//!
//! Maps `(objectType, action)` to the numeric activity type and the signed
//! rank amount configured for it. Every config key read here is mandatory.

use std::sync::Arc;

use crate::domain::entities::{ObjectId, ObjectType, ResolvedActivity};
use crate::domain::ports::{ConfigProvider, ObjectClassifier};
use crate::error::DomainError;

/// Config key for an action on an object type, e.g. `answer.voted_up`
pub fn activity_key(object_type: ObjectType, action: &str) -> String {
    format!("{}.{}", object_type, action)
}

pub struct ActivityTypeResolver<C, K>
where
    C: ConfigProvider,
    K: ObjectClassifier,
{
    config: Arc<C>,
    classifier: Arc<K>,
}

impl<C, K> ActivityTypeResolver<C, K>
where
    C: ConfigProvider,
    K: ObjectClassifier,
{
    pub fn new(config: Arc<C>, classifier: Arc<K>) -> Self {
        Self { config, classifier }
    }

    pub fn classify(&self, object_id: &ObjectId) -> Result<ObjectType, DomainError> {
        self.classifier.classify(object_id)
    }

    /// Classify the object, then resolve the action for its type
    pub fn resolve(
        &self,
        object_id: &ObjectId,
        action: &str,
    ) -> Result<(ObjectType, ResolvedActivity), DomainError> {
        let object_type = self.classify(object_id)?;
        let resolved = self.resolve_for_type(object_type, action)?;
        Ok((object_type, resolved))
    }

    /// Resolve an action when the object type is already known
    pub fn resolve_for_type(
        &self,
        object_type: ObjectType,
        action: &str,
    ) -> Result<ResolvedActivity, DomainError> {
        let key = activity_key(object_type, action);
        let activity_type = self.config.get_config_type(&key)?;
        let amount = self.config.get_int(&key)?;
        let rank = i32::try_from(amount).map_err(|_| {
            DomainError::Internal(format!("rank amount for {} out of range: {}", key, amount))
        })?;

        Ok(ResolvedActivity::new(activity_type, rank))
    }
}
