//! Rank mutation
//!
//! The only code path that writes `users.rank`. Enforces the rank floor on
//! every write and the daily earning cap on positive awards. Callers pass the
//! open transaction so the cap read and the write see the same state.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};

use crate::domain::entities::{RankChange, UserId, RANK_FLOOR};
use crate::domain::ports::{
    ConfigProvider, LedgerTransaction, DAILY_RANK_LIMIT_EXCLUDE_KEY, DAILY_RANK_LIMIT_KEY,
};
use crate::error::DomainError;

/// Start of the UTC calendar day containing `now`
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Floor-clamped absolute change: what `current + delta` becomes
pub fn clamp_change(current: i32, delta: i32) -> RankChange {
    if delta == 0 {
        return RankChange::Unchanged;
    }

    let target = current.saturating_add(delta);
    if target < RANK_FLOOR {
        RankChange::FloorClamped {
            applied: RANK_FLOOR - current,
            new_rank: RANK_FLOOR,
        }
    } else {
        RankChange::Applied {
            applied: delta,
            new_rank: target,
        }
    }
}

pub struct RankMutator<C>
where
    C: ConfigProvider,
{
    config: Arc<C>,
}

impl<C> RankMutator<C>
where
    C: ConfigProvider,
{
    pub fn new(config: Arc<C>) -> Self {
        Self { config }
    }

    /// Apply an award or penalty of `activity_type` to the user's rank.
    /// Positive deltas are subject to the daily cap; negative ones are floored.
    pub async fn apply<T>(
        &self,
        tx: &mut T,
        user_id: &UserId,
        delta: i32,
        activity_type: i32,
    ) -> Result<RankChange, DomainError>
    where
        T: LedgerTransaction,
    {
        if delta == 0 {
            return Ok(RankChange::Unchanged);
        }

        if delta < 0 {
            return self.revert(tx, user_id, delta).await;
        }

        let limit = self.config.get_int(DAILY_RANK_LIMIT_KEY)?;
        let excluded = self.excluded_types()?;

        let allowed = if excluded.contains(&activity_type) {
            delta
        } else {
            let earned = tx
                .sum_rank_since(user_id, start_of_day(Utc::now()), &excluded)
                .await?;
            if earned >= limit {
                tracing::info!(
                    user_id = %user_id,
                    activity_type = activity_type,
                    earned = earned,
                    limit = limit,
                    "Daily rank limit reached, award suppressed"
                );
                return Ok(RankChange::Suppressed);
            }
            // Trim to what is left of today's allowance
            i32::try_from(limit - earned).map_or(delta, |remaining| delta.min(remaining))
        };

        let current = tx.find_user_rank(user_id).await?;
        let change = self.change_by_absolute(tx, user_id, current, allowed).await?;

        tracing::debug!(
            user_id = %user_id,
            activity_type = activity_type,
            delta = delta,
            applied = change.applied(),
            "Rank award applied"
        );
        Ok(change)
    }

    /// Unconditional floor-clamped change from a known current rank.
    /// No daily cap evaluation.
    pub async fn change_by_absolute<T>(
        &self,
        tx: &mut T,
        user_id: &UserId,
        current: i32,
        delta: i32,
    ) -> Result<RankChange, DomainError>
    where
        T: LedgerTransaction,
    {
        let change = clamp_change(current, delta);
        match change {
            RankChange::Applied { new_rank, .. } | RankChange::FloorClamped { new_rank, .. } => {
                tx.update_user_rank(user_id, new_rank).await?;
            }
            RankChange::Unchanged | RankChange::Suppressed => {}
        }

        if let RankChange::FloorClamped { applied, new_rank } = change {
            tracing::info!(
                user_id = %user_id,
                requested = delta,
                applied = applied,
                new_rank = new_rank,
                "Rank clamped at floor"
            );
        }
        Ok(change)
    }

    /// Reverse a previously credited amount. Reads the current rank inside
    /// the transaction; uncapped and floored.
    pub async fn revert<T>(
        &self,
        tx: &mut T,
        user_id: &UserId,
        delta: i32,
    ) -> Result<RankChange, DomainError>
    where
        T: LedgerTransaction,
    {
        if delta == 0 {
            return Ok(RankChange::Unchanged);
        }
        let current = tx.find_user_rank(user_id).await?;
        self.change_by_absolute(tx, user_id, current, delta).await
    }

    /// Activity types exempt from the daily cap. An absent list means none.
    fn excluded_types(&self) -> Result<Vec<i32>, DomainError> {
        let keys = match self.config.get_array_string(DAILY_RANK_LIMIT_EXCLUDE_KEY) {
            Ok(keys) => keys,
            Err(DomainError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut types = Vec::with_capacity(keys.len());
        for key in &keys {
            match self.config.get_config_type(key) {
                Ok(activity_type) => types.push(activity_type),
                Err(DomainError::NotFound(_)) => {
                    tracing::warn!(key = %key, "Daily rank limit exclusion names an unknown key");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(types)
    }
}
