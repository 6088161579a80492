//! Domain entities
//!
//! Pure domain models for the rank ledger.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod activity;
pub mod event;
pub mod object;
pub mod rank;
pub mod user;
pub mod vote;

pub use activity::{is_self_triggered, Activity, ActivityId, NewActivity, ResolvedActivity};
pub use event::{ReputationEvent, ReputationEventKind};
pub use object::{AnswerInfo, ObjectId, ObjectType, QuestionInfo};
pub use rank::RankChange;
pub use user::{UserId, RANK_FLOOR};
pub use vote::{VoteDirection, VoteTally, VoteTarget};
