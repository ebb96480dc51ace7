use serde::{Deserialize, Serialize};

/// Whether every group is tracked or only those that opted in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    All,
    Limited,
}

impl TrackingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TrackingMode::All => "all",
            TrackingMode::Limited => "limited",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(TrackingMode::All),
            "limited" => Some(TrackingMode::Limited),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackingStatusBody {
    pub mode: TrackingMode,
    pub tracked_groups: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackingModeUpdate {
    pub mode: TrackingMode,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupTrackingUpdate {
    pub tracked: bool,
}
