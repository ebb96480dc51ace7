//! Engine orchestration: the check-in processor and the ledger contract it
//! commits through. The continuity decision itself lives in
//! `cadence-streak-core` and stays pure.

pub mod ledger;
pub mod processor;

pub use ledger::StreakLedger;
pub use processor::CheckinProcessor;
