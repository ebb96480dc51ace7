#![allow(dead_code)]

use cadence_schema::CheckinEvent;
use cadence_streak_core::TimeContext;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::SystemTime;

/// Test clock pinned to noon UTC of a calendar day; tests move it to simulate
/// the passage of days.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(date: NaiveDate) -> Self {
        Self {
            now: Mutex::new(noon(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.now.lock().unwrap() = noon(date);
    }

    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::days(days);
    }
}

impl TimeContext for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

fn noon(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn event(participant: &str, group: &str) -> CheckinEvent {
    CheckinEvent {
        participant_external_id: participant.to_string(),
        group_external_id: group.to_string(),
        group_display_name: format!("#{group}"),
        participant_timezone: Some("UTC".to_string()),
    }
}

/// Unique throwaway SQLite database under the system temp dir.
pub struct TempDb {
    pub url: String,
    path: PathBuf,
}

impl TempDb {
    pub fn new(tag: &str) -> Self {
        let tmp_dir = std::env::temp_dir();
        let mut hasher = DefaultHasher::new();
        SystemTime::now().hash(&mut hasher);
        tag.hash(&mut hasher);
        let path = tmp_dir.join(format!("cadence_test_{tag}_{:016x}.sqlite", hasher.finish()));
        let url = format!("sqlite:{}", path.to_str().unwrap());
        Self { url, path }
    }

    pub async fn cleanup(self) {
        let base = self.path.to_string_lossy().into_owned();
        let _ = tokio::fs::remove_file(format!("{base}-wal")).await;
        let _ = tokio::fs::remove_file(format!("{base}-shm")).await;
        let _ = tokio::fs::remove_file(&self.path).await;
    }
}
