use crate::error::CadenceError;
use crate::server::router::CadenceState;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use cadence_schema::{GroupTrackingUpdate, TrackingModeUpdate, TrackingStatusBody};
use serde_json::json;

pub async fn tracking_status(
    State(state): State<CadenceState>,
) -> Result<Json<TrackingStatusBody>, CadenceError> {
    Ok(Json(state.processor.tracking_status().await?))
}

/// Switch between tracking all groups and only opted-in groups. Switching to
/// `all` clears the opt-in list, so a later switch back starts from scratch.
pub async fn set_tracking_mode(
    State(state): State<CadenceState>,
    Json(update): Json<TrackingModeUpdate>,
) -> Result<Json<TrackingStatusBody>, CadenceError> {
    state.processor.set_tracking_mode(update.mode).await?;
    Ok(Json(state.processor.tracking_status().await?))
}

pub async fn set_group_tracking(
    State(state): State<CadenceState>,
    Path(group): Path<String>,
    Json(update): Json<GroupTrackingUpdate>,
) -> Result<Json<serde_json::Value>, CadenceError> {
    let changed = state
        .processor
        .set_group_tracked(&group, update.tracked)
        .await?;
    Ok(Json(
        json!({ "tracked": update.tracked, "changed": changed }),
    ))
}

pub fn router() -> Router<CadenceState> {
    Router::new()
        .route("/v1/tracking", get(tracking_status).put(set_tracking_mode))
        .route("/v1/groups/{group}/tracking", put(set_group_tracking))
}
