use std::sync::Arc;

use cadence_streak_core::continuity::Decision;
use chrono::NaiveDate;

use crate::db::{DbStreakRecord, StreakCommit, StreakStore};
use crate::error::CadenceError;

/// Read/update contract over the per-(participant, group) streak state.
pub struct StreakLedger {
    store: Arc<dyn StreakStore>,
}

impl StreakLedger {
    pub fn new(store: Arc<dyn StreakStore>) -> Self {
        Self { store }
    }

    /// Load the record for a pair, creating the all-zero record when absent.
    pub async fn get_or_create(
        &self,
        participant_id: i64,
        group_id: i64,
    ) -> Result<DbStreakRecord, CadenceError> {
        if let Some(record) = self
            .store
            .get_streak_record(participant_id, group_id)
            .await?
        {
            return Ok(record);
        }
        self.store
            .create_streak_record(participant_id, group_id)
            .await
    }

    /// Commit one decided transition. Advances `total_checkins` by exactly
    /// one, folds the longest-streak bookkeeping, and only applies while the
    /// record is unchanged since `record` was loaded.
    pub async fn commit(
        &self,
        record: &DbStreakRecord,
        decision: &Decision,
        today: NaiveDate,
    ) -> Result<(), CadenceError> {
        let longest = record.longest_streak.max(decision.new_streak);
        let (longest_start, longest_end) = if decision.new_streak > record.longest_streak {
            (Some(decision.streak_start), Some(today))
        } else {
            (record.longest_streak_start, record.longest_streak_end)
        };

        self.store
            .update_streak_record(StreakCommit {
                record_id: record.id,
                expected_updated_at: record.updated_at,
                current_streak: decision.new_streak,
                last_checkin_date: today,
                streak_start_date: decision.streak_start,
                longest_streak: longest,
                longest_streak_start: longest_start,
                longest_streak_end: longest_end,
            })
            .await
    }
}
