use cadence_streak_core::ExemptDayRule;
use cadence_streak_core::calendar::weekday_from_index;
use cadence_streak_core::continuity::StreakSnapshot;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::CadenceError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct DbParticipant {
    pub id: i64,
    pub external_id: String,
    pub timezone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct DbGroup {
    pub id: i64,
    pub external_id: String,
    pub display_name: String,
    pub tracked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct DbStreakRecord {
    pub id: i64,
    pub participant_id: i64,
    pub group_id: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub total_checkins: i64,
    pub last_checkin_date: Option<NaiveDate>,
    pub streak_start_date: Option<NaiveDate>,
    pub longest_streak_start: Option<NaiveDate>,
    pub longest_streak_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    /// Doubles as the optimistic-concurrency marker for conditional commits.
    pub updated_at: DateTime<Utc>,
}

impl DbStreakRecord {
    pub fn snapshot(&self) -> StreakSnapshot {
        StreakSnapshot {
            current_streak: self.current_streak,
            last_checkin_date: self.last_checkin_date,
            streak_start_date: self.streak_start_date,
        }
    }
}

/// One persisted exempt-day rule row. `kind` discriminates the payload shape;
/// [`DbExemptRule::to_rule`] enforces it exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct DbExemptRule {
    pub id: i64,
    pub participant_id: i64,
    pub kind: String,
    pub weekday: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl DbExemptRule {
    /// Interpret the row as an engine rule. Malformed rows surface a
    /// data-integrity error; they are never guessed at or silently dropped.
    pub fn to_rule(&self) -> Result<ExemptDayRule, CadenceError> {
        match self.kind.as_str() {
            "weekly" => {
                let index = self.weekday.ok_or_else(|| {
                    CadenceError::DataIntegrity(format!("weekly rule {} has no weekday", self.id))
                })?;
                let weekday = u8::try_from(index)
                    .ok()
                    .and_then(weekday_from_index)
                    .ok_or_else(|| {
                        CadenceError::DataIntegrity(format!(
                            "weekly rule {} has weekday {index} outside 0..=6",
                            self.id
                        ))
                    })?;
                Ok(ExemptDayRule::Weekly(weekday))
            }
            "range" => {
                let start = self.start_date.ok_or_else(|| {
                    CadenceError::DataIntegrity(format!("range rule {} has no start", self.id))
                })?;
                let end = self.end_date.ok_or_else(|| {
                    CadenceError::DataIntegrity(format!("range rule {} has no end", self.id))
                })?;
                Ok(ExemptDayRule::Range { start, end })
            }
            other => Err(CadenceError::DataIntegrity(format!(
                "exempt rule {} has unknown kind {other:?}",
                self.id
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct LeaderboardRow {
    pub participant_external_id: String,
    pub current_streak: i64,
}
