//! Unified error types for the reputation ledger
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core ledger errors, returned by every workflow
//! - `ConfigError`: Process configuration errors raised at startup

use thiserror::Error;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// Referenced object, user or configuration key does not exist
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Action not allowed for the object's type or actor
    #[error("Validation error: {0}")]
    Validation(String),

    /// Underlying transactional store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Concurrent request violated a uniqueness constraint
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Whether the caller may retry the whole operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Storage(_) | DomainError::Conflict(_))
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => DomainError::Conflict(msg),
            _ => DomainError::Storage(err.to_string()),
        }
    }
}

/// Process configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
