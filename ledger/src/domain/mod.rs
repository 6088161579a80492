//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: Domain models representing core ledger concepts
//! - `ports`: Trait definitions for storage, configuration, classification and notification

pub mod entities;
pub mod ports;
