//! PostgreSQL adapters
//!
//! Implementations of the ledger ports using SeaORM and PostgreSQL.

pub mod config_source;
pub mod schema;
pub mod store;


pub use config_source::PostgresConfigSource;
pub use schema::{ensure_schema, seed_config};
pub use store::{PostgresLedgerStore, PostgresLedgerTransaction};
