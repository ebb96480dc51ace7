pub mod checkin;
pub mod exempt;
pub mod stats;
pub mod tracking;

pub use checkin::{Celebration, CheckinEvent, CheckinResponse, CheckinResult};
pub use exempt::{ExemptRulePayload, ExemptRuleRecord, ExemptRulesBody, RuleCreatedBody};
pub use stats::{LeaderboardBody, LeaderboardEntry, StreakStatsBody};
pub use tracking::{GroupTrackingUpdate, TrackingMode, TrackingModeUpdate, TrackingStatusBody};
