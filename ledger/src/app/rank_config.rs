//! Default reputation configuration
//!
//! Rank amounts for each `{objectType}.{action}` key and the daily cap.
//! Used to seed an empty config table and as the fixture for tests.

use crate::domain::ports::{ConfigEntry, DAILY_RANK_LIMIT_EXCLUDE_KEY, DAILY_RANK_LIMIT_KEY};

/// Rank for voting a question up (voter)
pub const RANK_QUESTION_VOTE_UP: i32 = 0;

/// Rank for having a question voted up (owner)
pub const RANK_QUESTION_VOTED_UP: i32 = 10;

/// Rank for voting a question down (voter)
pub const RANK_QUESTION_VOTE_DOWN: i32 = 0;

/// Rank for having a question voted down (owner)
pub const RANK_QUESTION_VOTED_DOWN: i32 = -2;

/// Rank for voting an answer up (voter)
pub const RANK_ANSWER_VOTE_UP: i32 = 0;

/// Rank for having an answer voted up (owner)
pub const RANK_ANSWER_VOTED_UP: i32 = 10;

/// Rank for voting an answer down (voter pays)
pub const RANK_ANSWER_VOTE_DOWN: i32 = -1;

/// Rank for having an answer voted down (owner)
pub const RANK_ANSWER_VOTED_DOWN: i32 = -2;

/// Rank for accepting an answer (asker)
pub const RANK_ANSWER_ACCEPT: i32 = 2;

/// Rank for having an answer accepted (answerer)
pub const RANK_ANSWER_ACCEPTED: i32 = 15;

/// Comment votes are tracked but carry no rank
pub const RANK_COMMENT_VOTE_UP: i32 = 0;
pub const RANK_COMMENT_VOTED_UP: i32 = 0;

/// Rank for activating an account
pub const RANK_USER_ACTIVATED: i32 = 1;

/// Maximum positive rank a user may earn per calendar day
pub const DAILY_RANK_LIMIT: i64 = 200;

/// Default configuration rows; the row id is the activity type
pub fn default_entries() -> Vec<ConfigEntry> {
    let amounts: [(&str, i32); 13] = [
        ("question.vote_up", RANK_QUESTION_VOTE_UP),
        ("question.voted_up", RANK_QUESTION_VOTED_UP),
        ("question.vote_down", RANK_QUESTION_VOTE_DOWN),
        ("question.voted_down", RANK_QUESTION_VOTED_DOWN),
        ("answer.vote_up", RANK_ANSWER_VOTE_UP),
        ("answer.voted_up", RANK_ANSWER_VOTED_UP),
        ("answer.vote_down", RANK_ANSWER_VOTE_DOWN),
        ("answer.voted_down", RANK_ANSWER_VOTED_DOWN),
        ("answer.accept", RANK_ANSWER_ACCEPT),
        ("answer.accepted", RANK_ANSWER_ACCEPTED),
        ("comment.vote_up", RANK_COMMENT_VOTE_UP),
        ("comment.voted_up", RANK_COMMENT_VOTED_UP),
        ("user.activated", RANK_USER_ACTIVATED),
    ];

    let mut entries: Vec<ConfigEntry> = amounts
        .iter()
        .zip(1..)
        .map(|((key, amount), id)| ConfigEntry::new(id, *key, amount.to_string()))
        .collect();

    let next_id = entries.len() as i32 + 1;
    entries.push(ConfigEntry::new(
        next_id,
        DAILY_RANK_LIMIT_KEY,
        DAILY_RANK_LIMIT.to_string(),
    ));
    entries.push(ConfigEntry::new(
        next_id + 1,
        DAILY_RANK_LIMIT_EXCLUDE_KEY,
        r#"["answer.accepted"]"#,
    ));

    entries
}
