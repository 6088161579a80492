//! Application layer
//!
//! Contains the ledger workflows and the record-level steps they share.
//! Services coordinate between domain entities, ports, and the transactional store.

pub mod accept_service;
pub mod activity_ledger;
pub mod activity_type_resolver;
pub mod rank_adjustment_service;
pub mod rank_config;
pub mod rank_mutator;
pub mod rollback_service;
pub mod user_activation_service;
pub mod vote_service;

mod transaction;

pub use accept_service::{AcceptResult, AcceptService};
pub use activity_ledger::{ActivityLedger, AwardOutcome, AwardRequest};
pub use activity_type_resolver::{activity_key, ActivityTypeResolver};
pub use rank_adjustment_service::RankAdjustmentService;
pub use rank_mutator::RankMutator;
pub use rollback_service::{RollbackService, RollbackSummary};
pub use user_activation_service::UserActivationService;
pub use vote_service::VoteService;
