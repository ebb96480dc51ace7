use crate::error::CadenceError;
use crate::server::router::CadenceState;
use axum::{Json, Router, extract::State, routing::post};
use cadence_schema::{CheckinEvent, CheckinResponse};

/// Consume one check-in event from the chat transport. Repeats on the same
/// calendar day come back with `updated: false`, so delivery retries are safe.
pub async fn record_checkin(
    State(state): State<CadenceState>,
    Json(event): Json<CheckinEvent>,
) -> Result<Json<CheckinResponse>, CadenceError> {
    let response = state.processor.process(&event).await?;
    Ok(Json(response))
}

pub fn router() -> Router<CadenceState> {
    Router::new().route("/v1/checkins", post(record_checkin))
}
