use crate::db::models::{DbExemptRule, DbGroup, DbParticipant, DbStreakRecord, LeaderboardRow};
use crate::db::patch::StreakCommit;
use crate::db::schema::SQLITE_INIT;
use crate::db::traits::StreakStore;
use crate::error::CadenceError;
use async_trait::async_trait;
use cadence_schema::TrackingMode;
use cadence_streak_core::ExemptDayRule;
use cadence_streak_core::calendar::weekday_to_index;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

#[derive(Debug)]
pub enum DbActorMessage {
    /// Look up a participant by external id.
    FindParticipant(String, RpcReplyPort<Result<Option<DbParticipant>, CadenceError>>),

    /// Create or refresh a participant (None timezone preserves the stored one).
    UpsertParticipant(
        String,
        Option<String>,
        RpcReplyPort<Result<DbParticipant, CadenceError>>,
    ),

    /// Look up a group by external id.
    FindGroup(String, RpcReplyPort<Result<Option<DbGroup>, CadenceError>>),

    /// Create or refresh a group (display name follows the latest event).
    UpsertGroup(String, String, RpcReplyPort<Result<DbGroup, CadenceError>>),

    /// Load the streak record for a (participant, group) pair.
    GetStreakRecord(
        i64,
        i64,
        RpcReplyPort<Result<Option<DbStreakRecord>, CadenceError>>,
    ),

    /// Insert the all-zero record for a (participant, group) pair.
    CreateStreakRecord(i64, i64, RpcReplyPort<Result<DbStreakRecord, CadenceError>>),

    /// Conditional commit guarded by the record's updated_at marker.
    UpdateStreakRecord(StreakCommit, RpcReplyPort<Result<(), CadenceError>>),

    /// All exempt rules owned by a participant.
    ListExemptRules(i64, RpcReplyPort<Result<Vec<DbExemptRule>, CadenceError>>),

    /// Store one exempt rule and return its id.
    AddExemptRule(i64, ExemptDayRule, RpcReplyPort<Result<i64, CadenceError>>),

    /// Delete one exempt rule; false when it did not exist.
    RemoveExemptRule(i64, i64, RpcReplyPort<Result<bool, CadenceError>>),

    /// Top current streaks in a group.
    Leaderboard(i64, i64, RpcReplyPort<Result<Vec<LeaderboardRow>, CadenceError>>),

    GetTrackingMode(RpcReplyPort<Result<TrackingMode, CadenceError>>),

    SetTrackingMode(TrackingMode, RpcReplyPort<Result<(), CadenceError>>),

    /// Flip a group's opt-in flag, creating the group row if needed; replies
    /// with whether the flag changed.
    SetGroupTracked(String, bool, RpcReplyPort<Result<bool, CadenceError>>),

    TrackedGroups(RpcReplyPort<Result<Vec<String>, CadenceError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

macro_rules! db_rpc {
    ($self:expr, $variant:ident $(, $arg:expr)*) => {
        ractor::call!($self.actor, DbActorMessage::$variant $(, $arg)*).map_err(|e| {
            CadenceError::RactorError(format!(
                concat!("DbActor ", stringify!($variant), " RPC failed: {}"),
                e
            ))
        })?
    };
}

#[async_trait]
impl StreakStore for DbActorHandle {
    async fn find_participant(
        &self,
        external_id: &str,
    ) -> Result<Option<DbParticipant>, CadenceError> {
        db_rpc!(self, FindParticipant, external_id.to_string())
    }

    async fn upsert_participant(
        &self,
        external_id: &str,
        timezone: Option<&str>,
    ) -> Result<DbParticipant, CadenceError> {
        db_rpc!(
            self,
            UpsertParticipant,
            external_id.to_string(),
            timezone.map(str::to_string)
        )
    }

    async fn find_group(&self, external_id: &str) -> Result<Option<DbGroup>, CadenceError> {
        db_rpc!(self, FindGroup, external_id.to_string())
    }

    async fn upsert_group(
        &self,
        external_id: &str,
        display_name: &str,
    ) -> Result<DbGroup, CadenceError> {
        db_rpc!(
            self,
            UpsertGroup,
            external_id.to_string(),
            display_name.to_string()
        )
    }

    async fn get_streak_record(
        &self,
        participant_id: i64,
        group_id: i64,
    ) -> Result<Option<DbStreakRecord>, CadenceError> {
        db_rpc!(self, GetStreakRecord, participant_id, group_id)
    }

    async fn create_streak_record(
        &self,
        participant_id: i64,
        group_id: i64,
    ) -> Result<DbStreakRecord, CadenceError> {
        db_rpc!(self, CreateStreakRecord, participant_id, group_id)
    }

    async fn update_streak_record(&self, commit: StreakCommit) -> Result<(), CadenceError> {
        db_rpc!(self, UpdateStreakRecord, commit)
    }

    async fn list_exempt_rules(
        &self,
        participant_id: i64,
    ) -> Result<Vec<DbExemptRule>, CadenceError> {
        db_rpc!(self, ListExemptRules, participant_id)
    }

    async fn add_exempt_rule(
        &self,
        participant_id: i64,
        rule: ExemptDayRule,
    ) -> Result<i64, CadenceError> {
        db_rpc!(self, AddExemptRule, participant_id, rule)
    }

    async fn remove_exempt_rule(
        &self,
        participant_id: i64,
        rule_id: i64,
    ) -> Result<bool, CadenceError> {
        db_rpc!(self, RemoveExemptRule, participant_id, rule_id)
    }

    async fn leaderboard(
        &self,
        group_id: i64,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, CadenceError> {
        db_rpc!(self, Leaderboard, group_id, limit)
    }

    async fn tracking_mode(&self) -> Result<TrackingMode, CadenceError> {
        db_rpc!(self, GetTrackingMode)
    }

    async fn set_tracking_mode(&self, mode: TrackingMode) -> Result<(), CadenceError> {
        db_rpc!(self, SetTrackingMode, mode)
    }

    async fn set_group_tracked(
        &self,
        external_id: &str,
        tracked: bool,
    ) -> Result<bool, CadenceError> {
        db_rpc!(self, SetGroupTracked, external_id.to_string(), tracked)
    }

    async fn tracked_groups(&self) -> Result<Vec<String>, CadenceError> {
        db_rpc!(self, TrackedGroups)
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::FindParticipant(external_id, reply) => {
                let res = self.find_participant(&state.pool, &external_id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::UpsertParticipant(external_id, timezone, reply) => {
                let res = self
                    .upsert_participant(&state.pool, &external_id, timezone.as_deref())
                    .await;
                let _ = reply.send(res);
            }
            DbActorMessage::FindGroup(external_id, reply) => {
                let res = self.find_group(&state.pool, &external_id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::UpsertGroup(external_id, display_name, reply) => {
                let res = self
                    .upsert_group(&state.pool, &external_id, &display_name)
                    .await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetStreakRecord(participant_id, group_id, reply) => {
                let res = self
                    .get_streak_record(&state.pool, participant_id, group_id)
                    .await;
                let _ = reply.send(res);
            }
            DbActorMessage::CreateStreakRecord(participant_id, group_id, reply) => {
                let res = self
                    .create_streak_record(&state.pool, participant_id, group_id)
                    .await;
                let _ = reply.send(res);
            }
            DbActorMessage::UpdateStreakRecord(commit, reply) => {
                let res = self.update_streak_record(&state.pool, commit).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListExemptRules(participant_id, reply) => {
                let res = self.list_exempt_rules(&state.pool, participant_id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::AddExemptRule(participant_id, rule, reply) => {
                let res = self.add_exempt_rule(&state.pool, participant_id, rule).await;
                let _ = reply.send(res);
            }
            DbActorMessage::RemoveExemptRule(participant_id, rule_id, reply) => {
                let res = self
                    .remove_exempt_rule(&state.pool, participant_id, rule_id)
                    .await;
                let _ = reply.send(res);
            }
            DbActorMessage::Leaderboard(group_id, limit, reply) => {
                let res = self.leaderboard(&state.pool, group_id, limit).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetTrackingMode(reply) => {
                let res = self.tracking_mode(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::SetTrackingMode(mode, reply) => {
                let res = self.set_tracking_mode(&state.pool, mode).await;
                let _ = reply.send(res);
            }
            DbActorMessage::SetGroupTracked(external_id, tracked, reply) => {
                let res = self
                    .set_group_tracked(&state.pool, &external_id, tracked)
                    .await;
                let _ = reply.send(res);
            }
            DbActorMessage::TrackedGroups(reply) => {
                let res = self.tracked_groups(&state.pool).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

const PARTICIPANT_COLUMNS: &str = "id, external_id, timezone, created_at, updated_at";
const GROUP_COLUMNS: &str = "id, external_id, display_name, tracked, created_at, updated_at";
const STREAK_COLUMNS: &str = "id, participant_id, group_id, current_streak, longest_streak, \
     total_checkins, last_checkin_date, streak_start_date, longest_streak_start, \
     longest_streak_end, created_at, updated_at";

impl DbActor {
    async fn find_participant(
        &self,
        pool: &SqlitePool,
        external_id: &str,
    ) -> Result<Option<DbParticipant>, CadenceError> {
        let row = sqlx::query_as::<_, DbParticipant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE external_id = ?"
        ))
        .bind(external_id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn upsert_participant(
        &self,
        pool: &SqlitePool,
        external_id: &str,
        timezone: Option<&str>,
    ) -> Result<DbParticipant, CadenceError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, DbParticipant>(&format!(
            r#"
        INSERT INTO participants (external_id, timezone, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(external_id) DO UPDATE SET
            timezone = COALESCE(excluded.timezone, timezone),
            updated_at = excluded.updated_at
        RETURNING {PARTICIPANT_COLUMNS}
        "#
        ))
        .bind(external_id)
        .bind(timezone)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    async fn find_group(
        &self,
        pool: &SqlitePool,
        external_id: &str,
    ) -> Result<Option<DbGroup>, CadenceError> {
        let row = sqlx::query_as::<_, DbGroup>(&format!(
            "SELECT {GROUP_COLUMNS} FROM chat_groups WHERE external_id = ?"
        ))
        .bind(external_id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn upsert_group(
        &self,
        pool: &SqlitePool,
        external_id: &str,
        display_name: &str,
    ) -> Result<DbGroup, CadenceError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, DbGroup>(&format!(
            r#"
        INSERT INTO chat_groups (external_id, display_name, tracked, created_at, updated_at)
        VALUES (?, ?, 0, ?, ?)
        ON CONFLICT(external_id) DO UPDATE SET
            display_name = excluded.display_name,
            updated_at = excluded.updated_at
        RETURNING {GROUP_COLUMNS}
        "#
        ))
        .bind(external_id)
        .bind(display_name)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    async fn get_streak_record(
        &self,
        pool: &SqlitePool,
        participant_id: i64,
        group_id: i64,
    ) -> Result<Option<DbStreakRecord>, CadenceError> {
        let row = sqlx::query_as::<_, DbStreakRecord>(&format!(
            "SELECT {STREAK_COLUMNS} FROM streaks WHERE participant_id = ? AND group_id = ?"
        ))
        .bind(participant_id)
        .bind(group_id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn create_streak_record(
        &self,
        pool: &SqlitePool,
        participant_id: i64,
        group_id: i64,
    ) -> Result<DbStreakRecord, CadenceError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, DbStreakRecord>(&format!(
            r#"
        INSERT INTO streaks (
            participant_id, group_id, current_streak, longest_streak, total_checkins,
            created_at, updated_at
        )
        VALUES (?, ?, 0, 0, 0, ?, ?)
        RETURNING {STREAK_COLUMNS}
        "#
        ))
        .bind(participant_id)
        .bind(group_id)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    async fn update_streak_record(
        &self,
        pool: &SqlitePool,
        commit: StreakCommit,
    ) -> Result<(), CadenceError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
        UPDATE streaks SET
            current_streak = ?,
            longest_streak = ?,
            total_checkins = total_checkins + 1,
            last_checkin_date = ?,
            streak_start_date = ?,
            longest_streak_start = ?,
            longest_streak_end = ?,
            updated_at = ?
        WHERE id = ? AND updated_at = ?
        "#,
        )
        .bind(commit.current_streak)
        .bind(commit.longest_streak)
        .bind(commit.last_checkin_date)
        .bind(commit.streak_start_date)
        .bind(commit.longest_streak_start)
        .bind(commit.longest_streak_end)
        .bind(now)
        .bind(commit.record_id)
        .bind(commit.expected_updated_at)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CadenceError::CommitConflict(commit.record_id));
        }
        Ok(())
    }

    async fn list_exempt_rules(
        &self,
        pool: &SqlitePool,
        participant_id: i64,
    ) -> Result<Vec<DbExemptRule>, CadenceError> {
        let rows = sqlx::query_as::<_, DbExemptRule>(
            r#"
        SELECT id, participant_id, kind, weekday, start_date, end_date, created_at
        FROM exempt_rules
        WHERE participant_id = ?
        ORDER BY id
        "#,
        )
        .bind(participant_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn add_exempt_rule(
        &self,
        pool: &SqlitePool,
        participant_id: i64,
        rule: ExemptDayRule,
    ) -> Result<i64, CadenceError> {
        let now = Utc::now();
        let (kind, weekday, start_date, end_date) = match rule {
            ExemptDayRule::Weekly(weekday) => {
                ("weekly", Some(i64::from(weekday_to_index(weekday))), None, None)
            }
            ExemptDayRule::Range { start, end } => ("range", None, Some(start), Some(end)),
        };

        let id: i64 = sqlx::query_scalar(
            r#"
        INSERT INTO exempt_rules (participant_id, kind, weekday, start_date, end_date, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
        )
        .bind(participant_id)
        .bind(kind)
        .bind(weekday)
        .bind(start_date)
        .bind(end_date)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    async fn remove_exempt_rule(
        &self,
        pool: &SqlitePool,
        participant_id: i64,
        rule_id: i64,
    ) -> Result<bool, CadenceError> {
        let result = sqlx::query("DELETE FROM exempt_rules WHERE id = ? AND participant_id = ?")
            .bind(rule_id)
            .bind(participant_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn leaderboard(
        &self,
        pool: &SqlitePool,
        group_id: i64,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, CadenceError> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
        SELECT p.external_id AS participant_external_id, s.current_streak
        FROM streaks s
        JOIN participants p ON p.id = s.participant_id
        WHERE s.group_id = ?
        ORDER BY s.current_streak DESC, p.external_id ASC
        LIMIT ?
        "#,
        )
        .bind(group_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn tracking_mode(&self, pool: &SqlitePool) -> Result<TrackingMode, CadenceError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = 'tracking_mode'")
                .fetch_optional(pool)
                .await?;

        match value {
            None => Ok(TrackingMode::All),
            Some(raw) => TrackingMode::parse(&raw).ok_or_else(|| {
                CadenceError::DataIntegrity(format!("unknown tracking_mode {raw:?} in settings"))
            }),
        }
    }

    async fn set_tracking_mode(
        &self,
        pool: &SqlitePool,
        mode: TrackingMode,
    ) -> Result<(), CadenceError> {
        sqlx::query(
            r#"
        INSERT INTO settings (key, value) VALUES ('tracking_mode', ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
        )
        .bind(mode.as_str())
        .execute(pool)
        .await?;

        if mode == TrackingMode::All {
            sqlx::query("UPDATE chat_groups SET tracked = 0 WHERE tracked = 1")
                .execute(pool)
                .await?;
        }
        Ok(())
    }

    async fn set_group_tracked(
        &self,
        pool: &SqlitePool,
        external_id: &str,
        tracked: bool,
    ) -> Result<bool, CadenceError> {
        let previous: Option<bool> =
            sqlx::query_scalar("SELECT tracked FROM chat_groups WHERE external_id = ?")
                .bind(external_id)
                .fetch_optional(pool)
                .await?;

        let now = Utc::now();
        sqlx::query(
            r#"
        INSERT INTO chat_groups (external_id, display_name, tracked, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(external_id) DO UPDATE SET
            tracked = excluded.tracked,
            updated_at = excluded.updated_at
        "#,
        )
        .bind(external_id)
        .bind(external_id)
        .bind(tracked)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(previous != Some(tracked))
    }

    async fn tracked_groups(&self, pool: &SqlitePool) -> Result<Vec<String>, CadenceError> {
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT external_id FROM chat_groups WHERE tracked = 1 ORDER BY external_id",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}

/// Spawn the database actor and return a cloneable handle. Unnamed so that
/// isolated instances (one per test database) can coexist in one process.
pub async fn spawn(database_url: &str) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .expect("failed to spawn DbActor");

    DbActorHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), CadenceError> {
    sqlx::raw_sql(SQLITE_INIT).execute(pool).await?;
    Ok(())
}
