//! Test fixtures
//!
//! Factory functions for ids, configuration and a small populated Q&A store.

use std::sync::Arc;

use crate::adapters::config::{CachedConfigProvider, ConfigSnapshot, StaticConfigSource};
use crate::app::rank_config::default_entries;
use crate::domain::entities::{ObjectId, ObjectType, UserId};
use crate::domain::ports::ConfigEntry;
use crate::test_utils::mocks::InMemoryLedgerStore;

/// Owner of question 1 and comment 1
pub const ASKER: &str = "1";
/// Owner of answer 1
pub const ANSWERER: &str = "2";
/// Third user with no content of their own
pub const VOTER: &str = "3";

/// Config provider used across service tests
pub type TestConfig = CachedConfigProvider<StaticConfigSource>;

pub fn user(id: &str) -> UserId {
    UserId::from(id)
}

pub fn question_id(seq: u64) -> ObjectId {
    ObjectId::generate(ObjectType::Question, seq)
}

pub fn answer_id(seq: u64) -> ObjectId {
    ObjectId::generate(ObjectType::Answer, seq)
}

pub fn comment_id(seq: u64) -> ObjectId {
    ObjectId::generate(ObjectType::Comment, seq)
}

pub fn tag_id(seq: u64) -> ObjectId {
    ObjectId::generate(ObjectType::Tag, seq)
}

/// Config provider serving exactly `entries`
pub fn config_from(entries: Vec<ConfigEntry>) -> Arc<TestConfig> {
    let snapshot = ConfigSnapshot::from_entries(entries.clone());
    Arc::new(CachedConfigProvider::with_snapshot(
        Arc::new(StaticConfigSource::new(entries)),
        snapshot,
    ))
}

/// Config provider with the default rank amounts
pub fn test_config() -> Arc<TestConfig> {
    config_from(default_entries())
}

/// Default config with some values replaced; unknown keys are appended
pub fn test_config_with(overrides: &[(&str, &str)]) -> Arc<TestConfig> {
    let mut entries = default_entries();
    for (key, value) in overrides {
        match entries.iter_mut().find(|e| e.key == *key) {
            Some(entry) => entry.value = value.to_string(),
            None => {
                let id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
                entries.push(ConfigEntry::new(id, *key, *value));
            }
        }
    }
    config_from(entries)
}

/// Three users at rank 10, question 1 by ASKER with answer 1 by ANSWERER,
/// and comment 1 by ASKER
pub fn qa_store() -> InMemoryLedgerStore {
    InMemoryLedgerStore::new()
        .with_user(ASKER, 10)
        .with_user(ANSWERER, 10)
        .with_user(VOTER, 10)
        .with_question(question_id(1), ASKER)
        .with_answer(answer_id(1), question_id(1), ANSWERER)
        .with_comment(comment_id(1), ASKER)
}
