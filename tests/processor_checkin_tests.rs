mod common;

use std::sync::Arc;

use cadence::CheckinProcessor;
use cadence::db::StreakStore;
use cadence_schema::CheckinEvent;
use cadence_streak_core::ExemptDayRule;
use chrono::Weekday;
use common::{ManualClock, TempDb, day, event};

async fn setup(tag: &str, start: chrono::NaiveDate) -> (TempDb, Arc<ManualClock>, CheckinProcessor) {
    let db = TempDb::new(tag);
    let store: Arc<dyn StreakStore> = Arc::new(cadence::db::spawn(&db.url).await);
    let clock = Arc::new(ManualClock::at(start));
    let processor = CheckinProcessor::new(store, clock.clone());
    (db, clock, processor)
}

#[tokio::test]
async fn consecutive_days_count_up_monotonically() {
    let (db, clock, processor) = setup("monotonic", day(2024, 1, 1)).await;
    let evt = event("U1", "C1");

    for expected in 1..=5 {
        let response = processor.process(&evt).await.unwrap();
        assert!(response.result.updated);
        assert_eq!(response.result.streak_count, expected);
        assert!(response.result.is_new_achievement_candidate);
        assert!(!response.result.was_reset);
        clock.advance_days(1);
    }

    db.cleanup().await;
}

#[tokio::test]
async fn repeat_checkin_on_same_day_is_a_noop() {
    let (db, _clock, processor) = setup("idempotent", day(2024, 1, 1)).await;
    let evt = event("U1", "C1");

    let first = processor.process(&evt).await.unwrap();
    assert!(first.result.updated);
    assert_eq!(first.result.streak_count, 1);

    let repeat = processor.process(&evt).await.unwrap();
    assert!(!repeat.result.updated);
    assert_eq!(repeat.result.streak_count, 1);
    assert!(!repeat.result.is_new_achievement_candidate);
    assert!(repeat.celebration.is_none());

    let stats = processor.stats("U1", "C1").await.unwrap().unwrap();
    assert_eq!(stats.total_checkins, 1);

    db.cleanup().await;
}

#[tokio::test]
async fn weekend_rules_bridge_friday_to_monday() {
    // 2024-01-05 is a Friday.
    let (db, clock, processor) = setup("weekend", day(2024, 1, 5)).await;
    let evt = event("U1", "C1");

    processor
        .add_rule("U1", ExemptDayRule::Weekly(Weekday::Sat))
        .await
        .unwrap();
    processor
        .add_rule("U1", ExemptDayRule::Weekly(Weekday::Sun))
        .await
        .unwrap();

    let friday = processor.process(&evt).await.unwrap();
    assert_eq!(friday.result.streak_count, 1);

    clock.set(day(2024, 1, 8)); // Monday
    let monday = processor.process(&evt).await.unwrap();
    assert!(monday.result.updated);
    assert_eq!(monday.result.streak_count, 2);
    assert!(!monday.result.was_reset);

    db.cleanup().await;
}

#[tokio::test]
async fn missed_required_day_resets_to_one() {
    let (db, clock, processor) = setup("reset", day(2024, 1, 8)).await;
    let evt = event("U1", "C1");

    processor.process(&evt).await.unwrap();
    clock.advance_days(1);
    processor.process(&evt).await.unwrap();

    // Skip Wednesday entirely; check in again on Thursday.
    clock.advance_days(2);
    let thursday = processor.process(&evt).await.unwrap();
    assert!(thursday.result.updated);
    assert_eq!(thursday.result.streak_count, 1);
    assert!(thursday.result.was_reset);
    assert!(thursday.result.is_new_achievement_candidate);

    db.cleanup().await;
}

#[tokio::test]
async fn vacation_range_bridges_the_whole_span() {
    let (db, clock, processor) = setup("vacation", day(2024, 12, 19)).await;
    let evt = event("U1", "C1");

    processor
        .add_rule(
            "U1",
            ExemptDayRule::Range {
                start: day(2024, 12, 20),
                end: day(2024, 12, 31),
            },
        )
        .await
        .unwrap();

    processor.process(&evt).await.unwrap();
    clock.set(day(2025, 1, 1));
    let back = processor.process(&evt).await.unwrap();
    assert_eq!(back.result.streak_count, 2);
    assert!(!back.result.was_reset);

    db.cleanup().await;
}

#[tokio::test]
async fn checkin_on_exempt_day_still_continues() {
    // Friday, then a check-in on the exempt Saturday itself.
    let (db, clock, processor) = setup("exempt_today", day(2024, 1, 5)).await;
    let evt = event("U1", "C1");

    processor
        .add_rule("U1", ExemptDayRule::Weekly(Weekday::Sat))
        .await
        .unwrap();

    processor.process(&evt).await.unwrap();
    clock.advance_days(1);
    let saturday = processor.process(&evt).await.unwrap();
    assert!(saturday.result.updated);
    assert_eq!(saturday.result.streak_count, 2);

    db.cleanup().await;
}

#[tokio::test]
async fn seventh_day_produces_a_celebration() {
    let (db, clock, processor) = setup("milestone", day(2024, 3, 1)).await;
    let evt = event("U1", "C1");

    let mut last = None;
    for _ in 0..7 {
        last = Some(processor.process(&evt).await.unwrap());
        clock.advance_days(1);
    }

    let response = last.unwrap();
    assert_eq!(response.result.streak_count, 7);
    let celebration = response.celebration.expect("day 7 is a milestone");
    assert_eq!(celebration.milestone_days, 7);
    assert_eq!(celebration.participant_external_id, "U1");
    assert!(celebration.message.contains("1 week"));

    db.cleanup().await;
}

#[tokio::test]
async fn stats_round_trip_with_a_reset_in_the_middle() {
    let (db, clock, processor) = setup("stats", day(2024, 4, 1)).await;
    let evt = event("U1", "C1");

    // Three consecutive days, a gap, then one more check-in.
    for _ in 0..3 {
        processor.process(&evt).await.unwrap();
        clock.advance_days(1);
    }
    clock.advance_days(2);
    processor.process(&evt).await.unwrap();

    let stats = processor.stats("U1", "C1").await.unwrap().unwrap();
    assert_eq!(stats.total_checkins, 4);
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.longest_streak, 3);
    assert_eq!(stats.longest_streak_start, Some(day(2024, 4, 1)));
    assert_eq!(stats.longest_streak_end, Some(day(2024, 4, 3)));
    assert_eq!(stats.last_checkin_date, Some(day(2024, 4, 6)));
    assert_eq!(stats.streak_start_date, Some(day(2024, 4, 6)));

    db.cleanup().await;
}

#[tokio::test]
async fn unresolvable_timezone_falls_back_to_utc() {
    let (db, _clock, processor) = setup("bad_tz", day(2024, 1, 1)).await;
    let evt = CheckinEvent {
        participant_timezone: Some("Mars/OlympusMons".to_string()),
        ..event("U1", "C1")
    };

    let response = processor.process(&evt).await.unwrap();
    assert!(response.result.updated);
    assert_eq!(response.result.streak_count, 1);

    db.cleanup().await;
}

#[tokio::test]
async fn streaks_are_independent_per_group() {
    let (db, clock, processor) = setup("per_group", day(2024, 1, 1)).await;

    processor.process(&event("U1", "C1")).await.unwrap();
    clock.advance_days(1);
    processor.process(&event("U1", "C1")).await.unwrap();
    processor.process(&event("U1", "C2")).await.unwrap();

    let in_c1 = processor.stats("U1", "C1").await.unwrap().unwrap();
    let in_c2 = processor.stats("U1", "C2").await.unwrap().unwrap();
    assert_eq!(in_c1.current_streak, 2);
    assert_eq!(in_c2.current_streak, 1);

    db.cleanup().await;
}

#[tokio::test]
async fn stats_for_unknown_pair_is_none() {
    let (db, _clock, processor) = setup("no_stats", day(2024, 1, 1)).await;
    assert!(processor.stats("U9", "C9").await.unwrap().is_none());
    db.cleanup().await;
}
