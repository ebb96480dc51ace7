use serde::{Deserialize, Serialize};

/// Inbound check-in event handed over by the chat-transport collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckinEvent {
    pub participant_external_id: String,
    pub group_external_id: String,
    pub group_display_name: String,
    /// IANA zone name as reported by the chat platform for this event; the
    /// engine falls back to UTC when missing or unresolvable.
    #[serde(default)]
    pub participant_timezone: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckinResult {
    pub updated: bool,
    pub streak_count: i64,
    pub is_new_achievement_candidate: bool,
    pub was_reset: bool,
}

/// Celebration content for the transport to render and deliver; the engine
/// never talks to the chat platform itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Celebration {
    pub participant_external_id: String,
    pub milestone_days: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckinResponse {
    pub result: CheckinResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub celebration: Option<Celebration>,
}
