use async_trait::async_trait;
use cadence_schema::TrackingMode;
use cadence_streak_core::ExemptDayRule;

use crate::db::models::{DbExemptRule, DbGroup, DbParticipant, DbStreakRecord, LeaderboardRow};
use crate::db::patch::StreakCommit;
use crate::error::CadenceError;

/// Persistence contract the engine consumes. Implemented by the DB actor
/// handle in production; tests may substitute their own store.
#[async_trait]
pub trait StreakStore: Send + Sync {
    async fn find_participant(
        &self,
        external_id: &str,
    ) -> Result<Option<DbParticipant>, CadenceError>;

    /// Create or refresh a participant. A `None` timezone preserves whatever
    /// is already stored.
    async fn upsert_participant(
        &self,
        external_id: &str,
        timezone: Option<&str>,
    ) -> Result<DbParticipant, CadenceError>;

    async fn find_group(&self, external_id: &str) -> Result<Option<DbGroup>, CadenceError>;

    async fn upsert_group(
        &self,
        external_id: &str,
        display_name: &str,
    ) -> Result<DbGroup, CadenceError>;

    async fn get_streak_record(
        &self,
        participant_id: i64,
        group_id: i64,
    ) -> Result<Option<DbStreakRecord>, CadenceError>;

    async fn create_streak_record(
        &self,
        participant_id: i64,
        group_id: i64,
    ) -> Result<DbStreakRecord, CadenceError>;

    /// Conditional update; fails with `CommitConflict` when the record's
    /// `updated_at` no longer matches the commit's expectation.
    async fn update_streak_record(&self, commit: StreakCommit) -> Result<(), CadenceError>;

    async fn list_exempt_rules(
        &self,
        participant_id: i64,
    ) -> Result<Vec<DbExemptRule>, CadenceError>;

    async fn add_exempt_rule(
        &self,
        participant_id: i64,
        rule: ExemptDayRule,
    ) -> Result<i64, CadenceError>;

    async fn remove_exempt_rule(
        &self,
        participant_id: i64,
        rule_id: i64,
    ) -> Result<bool, CadenceError>;

    async fn leaderboard(
        &self,
        group_id: i64,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, CadenceError>;

    async fn tracking_mode(&self) -> Result<TrackingMode, CadenceError>;

    /// Switching to `All` clears every per-group opt-in.
    async fn set_tracking_mode(&self, mode: TrackingMode) -> Result<(), CadenceError>;

    /// Returns whether the flag actually changed. Creates the group row when
    /// it does not exist yet (display name defaults to the external id).
    async fn set_group_tracked(
        &self,
        external_id: &str,
        tracked: bool,
    ) -> Result<bool, CadenceError>;

    async fn tracked_groups(&self) -> Result<Vec<String>, CadenceError>;
}
