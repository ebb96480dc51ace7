//! Calendar-aware streak continuity engine.
//!
//! Pure logic only: no persistence, no transport, no wall-clock access outside
//! the [`calendar::TimeContext`] seam. The service crate feeds this engine a
//! snapshot of persisted state and commits whatever it decides.

pub mod calendar;
pub mod continuity;
pub mod exempt;
pub mod milestone;

pub use calendar::{SystemClock, TimeContext};
pub use continuity::{Continuity, Decision, StreakSnapshot};
pub use exempt::ExemptDayRule;
pub use milestone::Milestone;
