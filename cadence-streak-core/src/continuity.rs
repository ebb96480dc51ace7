use chrono::NaiveDate;

use crate::exempt::{ExemptDayRule, is_exempt};

/// Snapshot of the persisted streak state the continuity decision reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakSnapshot {
    pub current_streak: i64,
    pub last_checkin_date: Option<NaiveDate>,
    pub streak_start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuity {
    /// Same calendar day as the last recorded check-in; a repeat is a no-op.
    AlreadyCounted,
    /// `today` resolved to a day before the last recorded check-in (the
    /// participant's timezone moved backwards between events); nothing to do.
    OutOfOrder,
    /// First check-in ever for this (participant, group) pair.
    Started,
    /// Every day strictly between the last check-in and today was exempt.
    Continued,
    /// At least one required day in the gap was never checked into.
    Broken,
}

/// What the ledger should commit, plus how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub continuity: Continuity,
    pub new_streak: i64,
    pub streak_start: NaiveDate,
    pub was_reset: bool,
}

impl Decision {
    pub fn counts(&self) -> bool {
        !matches!(
            self.continuity,
            Continuity::AlreadyCounted | Continuity::OutOfOrder
        )
    }
}

/// The continuity algorithm. Pure: only the two endpoints and the exemption
/// rules are consulted, so the cost is O(gap length) with no check-in history.
///
/// The forward scan walks from the day after the last check-in while days are
/// exempt, stopping at the first required day or at `today`. Reaching `today`
/// means the gap was bridged entirely by exempt days and the streak continues;
/// whether `today` itself is exempt does not block continuation. Stopping
/// short means a required day went unchecked and the streak restarts at 1.
pub fn evaluate(snapshot: &StreakSnapshot, today: NaiveDate, rules: &[ExemptDayRule]) -> Decision {
    let Some(last) = snapshot.last_checkin_date else {
        return Decision {
            continuity: Continuity::Started,
            new_streak: 1,
            streak_start: today,
            was_reset: false,
        };
    };

    if last == today {
        return Decision {
            continuity: Continuity::AlreadyCounted,
            new_streak: snapshot.current_streak,
            streak_start: snapshot.streak_start_date.unwrap_or(last),
            was_reset: false,
        };
    }
    if last > today {
        return Decision {
            continuity: Continuity::OutOfOrder,
            new_streak: snapshot.current_streak,
            streak_start: snapshot.streak_start_date.unwrap_or(last),
            was_reset: false,
        };
    }

    // last < today, so succ_opt cannot overflow before the loop ends.
    let mut day = last.succ_opt().unwrap_or(today);
    while day < today && is_exempt(day, rules) {
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    if day == today {
        Decision {
            continuity: Continuity::Continued,
            new_streak: snapshot.current_streak + 1,
            streak_start: snapshot.streak_start_date.unwrap_or(last),
            was_reset: false,
        }
    } else {
        Decision {
            continuity: Continuity::Broken,
            new_streak: 1,
            streak_start: today,
            was_reset: snapshot.current_streak > 1,
        }
    }
}
