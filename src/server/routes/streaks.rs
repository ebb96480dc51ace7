use crate::error::CadenceError;
use crate::server::router::CadenceState;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use cadence_schema::{LeaderboardBody, StreakStatsBody};
use serde::Deserialize;

pub async fn streak_stats(
    State(state): State<CadenceState>,
    Path((group, participant)): Path<(String, String)>,
) -> Result<Json<StreakStatsBody>, CadenceError> {
    state
        .processor
        .stats(&participant, &group)
        .await?
        .map(Json)
        .ok_or(CadenceError::NotFound("streak record"))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

pub async fn group_leaderboard(
    State(state): State<CadenceState>,
    Path(group): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardBody>, CadenceError> {
    let body = state.processor.leaderboard(&group, query.limit).await?;
    Ok(Json(body))
}

pub fn router() -> Router<CadenceState> {
    Router::new()
        .route(
            "/v1/groups/{group}/participants/{participant}/streak",
            get(streak_stats),
        )
        .route("/v1/groups/{group}/leaderboard", get(group_leaderboard))
}
