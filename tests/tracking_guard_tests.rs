mod common;

use std::sync::Arc;

use cadence::{CadenceError, CheckinProcessor};
use cadence::db::StreakStore;
use cadence_schema::TrackingMode;
use common::{ManualClock, TempDb, day, event};

async fn setup(tag: &str) -> (TempDb, Arc<ManualClock>, CheckinProcessor) {
    let db = TempDb::new(tag);
    let store: Arc<dyn StreakStore> = Arc::new(cadence::db::spawn(&db.url).await);
    let clock = Arc::new(ManualClock::at(day(2024, 1, 1)));
    let processor = CheckinProcessor::new(store, clock.clone());
    (db, clock, processor)
}

#[tokio::test]
async fn limited_mode_rejects_groups_that_did_not_opt_in() {
    let (db, _clock, processor) = setup("guard").await;

    // Opting one group in restricts tracking to opted-in groups.
    assert!(processor.set_group_tracked("C1", true).await.unwrap());
    let status = processor.tracking_status().await.unwrap();
    assert_eq!(status.mode, TrackingMode::Limited);
    assert_eq!(status.tracked_groups, vec!["C1"]);

    let tracked = processor.process(&event("U1", "C1")).await.unwrap();
    assert!(tracked.result.updated);

    let rejected = processor.process(&event("U1", "C2")).await;
    assert!(matches!(rejected, Err(CadenceError::UntrackedGroup(group)) if group == "C2"));

    db.cleanup().await;
}

#[tokio::test]
async fn resetting_to_all_reopens_every_group() {
    let (db, _clock, processor) = setup("reset_all").await;

    processor.set_group_tracked("C1", true).await.unwrap();
    assert!(processor.process(&event("U1", "C2")).await.is_err());

    processor.set_tracking_mode(TrackingMode::All).await.unwrap();
    let status = processor.tracking_status().await.unwrap();
    assert_eq!(status.mode, TrackingMode::All);
    assert!(status.tracked_groups.is_empty());

    let accepted = processor.process(&event("U1", "C2")).await.unwrap();
    assert!(accepted.result.updated);

    db.cleanup().await;
}

#[tokio::test]
async fn opting_out_keeps_limited_mode() {
    let (db, _clock, processor) = setup("opt_out").await;

    processor.set_group_tracked("C1", true).await.unwrap();
    processor.set_group_tracked("C2", true).await.unwrap();
    assert!(processor.set_group_tracked("C1", false).await.unwrap());

    let status = processor.tracking_status().await.unwrap();
    assert_eq!(status.mode, TrackingMode::Limited);
    assert_eq!(status.tracked_groups, vec!["C2"]);
    assert!(processor.process(&event("U1", "C1")).await.is_err());

    db.cleanup().await;
}

#[tokio::test]
async fn leaderboard_reflects_current_streaks() {
    let (db, clock, processor) = setup("board").await;

    // alice: two days; bob: one day.
    processor.process(&event("alice", "C1")).await.unwrap();
    processor.process(&event("bob", "C1")).await.unwrap();
    clock.advance_days(1);
    processor.process(&event("alice", "C1")).await.unwrap();

    let board = processor.leaderboard("C1", None).await.unwrap();
    let order: Vec<(&str, i64)> = board
        .entries
        .iter()
        .map(|entry| (entry.participant_external_id.as_str(), entry.current_streak))
        .collect();
    assert_eq!(order, vec![("alice", 2), ("bob", 1)]);

    // Unknown groups simply have no entries.
    let empty = processor.leaderboard("C9", None).await.unwrap();
    assert!(empty.entries.is_empty());

    db.cleanup().await;
}
