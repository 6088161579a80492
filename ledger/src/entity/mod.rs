//! SeaORM entity models
//!
//! Table-shaped rows for the ledger's storage. Domain types live in
//! `domain::entities`; conversions are defined next to each model.

pub mod activity;
pub mod answer;
pub mod comment;
pub mod config;
pub mod question;
pub mod users;
