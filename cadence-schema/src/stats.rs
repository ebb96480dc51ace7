use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Streak statistics for one (participant, group) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreakStatsBody {
    pub current_streak: i64,
    pub longest_streak: i64,
    pub total_checkins: i64,
    pub last_checkin_date: Option<NaiveDate>,
    pub streak_start_date: Option<NaiveDate>,
    pub longest_streak_start: Option<NaiveDate>,
    pub longest_streak_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub participant_external_id: String,
    pub current_streak: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardBody {
    pub group_external_id: String,
    pub entries: Vec<LeaderboardEntry>,
}
