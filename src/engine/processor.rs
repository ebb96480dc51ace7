use std::sync::Arc;
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use cadence_schema::{
    Celebration, CheckinEvent, CheckinResponse, CheckinResult, LeaderboardBody, LeaderboardEntry,
    StreakStatsBody, TrackingMode, TrackingStatusBody,
};
use cadence_streak_core::calendar::parse_timezone;
use cadence_streak_core::{ExemptDayRule, TimeContext, continuity, milestone};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::db::{DbExemptRule, StreakStore};
use crate::engine::ledger::StreakLedger;
use crate::error::{CadenceError, IsRetryable};

/// Leaderboard rows returned when the caller does not ask for a count.
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// Orchestrates one check-in: resolves the calendar day, loads state and
/// rules, applies the continuity decision, and commits it. Holds no state of
/// its own beyond the injected collaborators, so isolated instances are cheap.
pub struct CheckinProcessor {
    store: Arc<dyn StreakStore>,
    ledger: StreakLedger,
    clock: Arc<dyn TimeContext>,
}

impl CheckinProcessor {
    pub fn new(store: Arc<dyn StreakStore>, clock: Arc<dyn TimeContext>) -> Self {
        let ledger = StreakLedger::new(store.clone());
        Self {
            store,
            ledger,
            clock,
        }
    }

    /// Process one inbound check-in event.
    ///
    /// A commit conflict means another event for the same pair won the
    /// read-modify-write race; the whole invocation is retried once, where the
    /// idempotence guard turns a duplicate-day loser into a no-op.
    pub async fn process(&self, event: &CheckinEvent) -> Result<CheckinResponse, CadenceError> {
        let retry_once = ConstantBuilder::default()
            .with_delay(Duration::ZERO)
            .with_max_times(1);

        (|| self.process_once(event))
            .retry(retry_once)
            .when(CadenceError::is_retryable)
            .await
    }

    async fn process_once(&self, event: &CheckinEvent) -> Result<CheckinResponse, CadenceError> {
        let tz = self.resolve_timezone(event);
        let today = self.clock.today(tz);

        self.ensure_tracked(&event.group_external_id).await?;

        let participant = self
            .store
            .upsert_participant(
                &event.participant_external_id,
                event.participant_timezone.as_deref(),
            )
            .await?;
        let group = self
            .store
            .upsert_group(&event.group_external_id, &event.group_display_name)
            .await?;

        let record = self.ledger.get_or_create(participant.id, group.id).await?;
        let rules = engine_rules(&self.store.list_exempt_rules(participant.id).await?)?;

        let decision = continuity::evaluate(&record.snapshot(), today, &rules);
        if !decision.counts() {
            debug!(
                participant = %event.participant_external_id,
                group = %event.group_external_id,
                %today,
                "repeat check-in ignored"
            );
            return Ok(CheckinResponse {
                result: CheckinResult {
                    updated: false,
                    streak_count: record.current_streak,
                    is_new_achievement_candidate: false,
                    was_reset: false,
                },
                celebration: None,
            });
        }

        self.ledger.commit(&record, &decision, today).await?;

        info!(
            participant = %event.participant_external_id,
            group = %event.group_external_id,
            streak = decision.new_streak,
            was_reset = decision.was_reset,
            "recorded check-in"
        );

        let celebration = milestone::detect(decision.new_streak).map(|m| Celebration {
            participant_external_id: event.participant_external_id.clone(),
            milestone_days: m.days,
            message: m.announcement(&mut rand::rng()),
        });

        Ok(CheckinResponse {
            result: CheckinResult {
                updated: true,
                streak_count: decision.new_streak,
                is_new_achievement_candidate: decision.new_streak == 1
                    || decision.new_streak > record.current_streak,
                was_reset: decision.was_reset,
            },
            celebration,
        })
    }

    /// UTC fallback, applied exactly once where an event enters the engine.
    fn resolve_timezone(&self, event: &CheckinEvent) -> Tz {
        match event.participant_timezone.as_deref() {
            None => Tz::UTC,
            Some(raw) => parse_timezone(raw).unwrap_or_else(|| {
                debug!(
                    participant = %event.participant_external_id,
                    timezone = %raw,
                    "unresolvable timezone; falling back to UTC"
                );
                Tz::UTC
            }),
        }
    }

    async fn ensure_tracked(&self, group_external_id: &str) -> Result<(), CadenceError> {
        match self.store.tracking_mode().await? {
            TrackingMode::All => Ok(()),
            TrackingMode::Limited => {
                let tracked = self
                    .store
                    .find_group(group_external_id)
                    .await?
                    .is_some_and(|group| group.tracked);
                if tracked {
                    Ok(())
                } else {
                    Err(CadenceError::UntrackedGroup(group_external_id.to_string()))
                }
            }
        }
    }

    /// Streak statistics for one (participant, group) pair, or `None` when
    /// either side has never been seen.
    pub async fn stats(
        &self,
        participant_external_id: &str,
        group_external_id: &str,
    ) -> Result<Option<StreakStatsBody>, CadenceError> {
        let Some(participant) = self.store.find_participant(participant_external_id).await? else {
            return Ok(None);
        };
        let Some(group) = self.store.find_group(group_external_id).await? else {
            return Ok(None);
        };
        let Some(record) = self.store.get_streak_record(participant.id, group.id).await? else {
            return Ok(None);
        };

        Ok(Some(StreakStatsBody {
            current_streak: record.current_streak,
            longest_streak: record.longest_streak,
            total_checkins: record.total_checkins,
            last_checkin_date: record.last_checkin_date,
            streak_start_date: record.streak_start_date,
            longest_streak_start: record.longest_streak_start,
            longest_streak_end: record.longest_streak_end,
        }))
    }

    pub async fn leaderboard(
        &self,
        group_external_id: &str,
        limit: Option<i64>,
    ) -> Result<LeaderboardBody, CadenceError> {
        let limit = limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT).clamp(1, 100);
        let entries = match self.store.find_group(group_external_id).await? {
            None => Vec::new(),
            Some(group) => self
                .store
                .leaderboard(group.id, limit)
                .await?
                .into_iter()
                .map(|row| LeaderboardEntry {
                    participant_external_id: row.participant_external_id,
                    current_streak: row.current_streak,
                })
                .collect(),
        };

        Ok(LeaderboardBody {
            group_external_id: group_external_id.to_string(),
            entries,
        })
    }

    /// Store a new exempt rule, creating the participant row when this is the
    /// first thing known about them.
    pub async fn add_rule(
        &self,
        participant_external_id: &str,
        rule: ExemptDayRule,
    ) -> Result<i64, CadenceError> {
        if let ExemptDayRule::Range { start, end } = rule {
            if start > end {
                return Err(CadenceError::InvalidArgument(format!(
                    "range start {start} is after end {end}"
                )));
            }
        }
        let participant = self
            .store
            .upsert_participant(participant_external_id, None)
            .await?;
        self.store.add_exempt_rule(participant.id, rule).await
    }

    pub async fn list_rules(
        &self,
        participant_external_id: &str,
    ) -> Result<Vec<DbExemptRule>, CadenceError> {
        let Some(participant) = self.store.find_participant(participant_external_id).await? else {
            return Ok(Vec::new());
        };
        self.store.list_exempt_rules(participant.id).await
    }

    pub async fn remove_rule(
        &self,
        participant_external_id: &str,
        rule_id: i64,
    ) -> Result<bool, CadenceError> {
        let Some(participant) = self.store.find_participant(participant_external_id).await? else {
            return Ok(false);
        };
        self.store.remove_exempt_rule(participant.id, rule_id).await
    }

    pub async fn tracking_status(&self) -> Result<TrackingStatusBody, CadenceError> {
        Ok(TrackingStatusBody {
            mode: self.store.tracking_mode().await?,
            tracked_groups: self.store.tracked_groups().await?,
        })
    }

    /// `All` clears every opt-in at the store level.
    pub async fn set_tracking_mode(&self, mode: TrackingMode) -> Result<(), CadenceError> {
        self.store.set_tracking_mode(mode).await
    }

    /// Opting a group in implies restricted tracking; other groups must then
    /// opt in too. Opting out never changes the mode.
    pub async fn set_group_tracked(
        &self,
        group_external_id: &str,
        tracked: bool,
    ) -> Result<bool, CadenceError> {
        if tracked {
            self.store.set_tracking_mode(TrackingMode::Limited).await?;
        }
        self.store
            .set_group_tracked(group_external_id, tracked)
            .await
    }
}

fn engine_rules(rows: &[DbExemptRule]) -> Result<Vec<ExemptDayRule>, CadenceError> {
    rows.iter().map(DbExemptRule::to_rule).collect()
}
