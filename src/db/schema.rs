//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `participants` (one row per chat user, keyed by external id)
/// - `chat_groups` (one row per group, created lazily on first check-in)
/// - `streaks` (one row per (participant, group) pair; never deleted)
/// - `exempt_rules` (weekly or date-range rows owned by a participant)
/// - `settings` (key-value; currently only `tracking_mode`)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Participants (timezone is informational; the engine always uses the zone
-- supplied with the current event)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS participants (
    id INTEGER PRIMARY KEY NOT NULL,
    external_id TEXT NOT NULL UNIQUE,
    timezone TEXT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL  -- RFC3339
);

-- ---------------------------------------------------------------------------
-- Groups ("chat_groups": GROUPS is reserved in newer SQLite)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS chat_groups (
    id INTEGER PRIMARY KEY NOT NULL,
    external_id TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    tracked INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL  -- RFC3339
);

-- ---------------------------------------------------------------------------
-- Streak records (one per (participant, group); updated_at doubles as the
-- optimistic-concurrency marker for conditional commits)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS streaks (
    id INTEGER PRIMARY KEY NOT NULL,
    participant_id INTEGER NOT NULL REFERENCES participants(id),
    group_id INTEGER NOT NULL REFERENCES chat_groups(id),
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    total_checkins INTEGER NOT NULL DEFAULT 0,
    last_checkin_date TEXT NULL,    -- YYYY-MM-DD
    streak_start_date TEXT NULL,    -- YYYY-MM-DD
    longest_streak_start TEXT NULL, -- YYYY-MM-DD
    longest_streak_end TEXT NULL,   -- YYYY-MM-DD
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL, -- RFC3339
    UNIQUE(participant_id, group_id)
);

CREATE INDEX IF NOT EXISTS idx_streaks_group_current
    ON streaks(group_id, current_streak);

-- ---------------------------------------------------------------------------
-- Exempt-day rules (kind 'weekly' uses weekday 0=Sunday..6=Saturday;
-- kind 'range' uses the inclusive start/end dates)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS exempt_rules (
    id INTEGER PRIMARY KEY NOT NULL,
    participant_id INTEGER NOT NULL REFERENCES participants(id),
    kind TEXT NOT NULL,
    weekday INTEGER NULL,
    start_date TEXT NULL, -- YYYY-MM-DD
    end_date TEXT NULL,   -- YYYY-MM-DD
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_exempt_rules_participant
    ON exempt_rules(participant_id);

-- ---------------------------------------------------------------------------
-- Service settings
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);

INSERT OR IGNORE INTO settings (key, value) VALUES ('tracking_mode', 'all');
"#;
