pub mod checkins;
pub mod exemptions;
pub mod streaks;
pub mod tracking;
