//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `patch.rs`: the streak-commit payload with its concurrency guard
//! - `traits.rs`: the `StreakStore` contract the engine consumes
//! - `actor.rs`: single-writer actor owning the SQLite pool

pub mod actor;
pub mod models;
pub mod patch;
pub mod schema;
pub mod traits;

pub use models::{DbExemptRule, DbGroup, DbParticipant, DbStreakRecord, LeaderboardRow};
pub use patch::StreakCommit;
pub use schema::SQLITE_INIT;
pub use traits::StreakStore;

pub use actor::{DbActorHandle, spawn};
