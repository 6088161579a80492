//! Test utilities
//!
//! Manual in-memory implementations of the store and notifier ports, plus
//! fixtures for unit testing.
//!
//! mockall is used for the small synchronous-looking ports (config source,
//! classifier). The ledger store is a manual fake instead, because its
//! transactions must actually hold state across calls and roll back.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
