//! Outcome of a rank mutation

use serde::Serialize;

/// What happened to a user's rank counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RankChange {
    /// Zero delta, nothing written
    Unchanged,
    /// Delta (possibly trimmed to the remaining daily allowance) was applied
    Applied { applied: i32, new_rank: i32 },
    /// Daily cap already reached; counter untouched
    Suppressed,
    /// A negative delta would have crossed the floor; rank set to the floor
    FloorClamped { applied: i32, new_rank: i32 },
}

impl RankChange {
    /// Amount that actually reached the user's counter
    pub fn applied(&self) -> i32 {
        match self {
            RankChange::Applied { applied, .. } | RankChange::FloorClamped { applied, .. } => {
                *applied
            }
            RankChange::Unchanged | RankChange::Suppressed => 0,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, RankChange::Suppressed)
    }
}
