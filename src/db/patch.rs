use chrono::{DateTime, NaiveDate, Utc};

/// One committed state transition for a streak record.
///
/// `expected_updated_at` is the optimistic-concurrency guard: the UPDATE only
/// applies while the row still carries that marker, and `total_checkins`
/// advances by exactly one per applied commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakCommit {
    pub record_id: i64,
    pub expected_updated_at: DateTime<Utc>,
    pub current_streak: i64,
    pub last_checkin_date: NaiveDate,
    pub streak_start_date: NaiveDate,
    pub longest_streak: i64,
    pub longest_streak_start: Option<NaiveDate>,
    pub longest_streak_end: Option<NaiveDate>,
}
