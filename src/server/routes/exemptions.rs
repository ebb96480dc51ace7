use crate::db::DbExemptRule;
use crate::error::CadenceError;
use crate::server::router::CadenceState;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use cadence_schema::{
    ExemptRulePayload, ExemptRuleRecord, ExemptRulesBody, RuleCreatedBody,
    exempt::{RangeRulePayload, WeeklyRulePayload},
};
use cadence_streak_core::ExemptDayRule;
use cadence_streak_core::calendar::{weekday_from_index, weekday_to_index};

/// Wire → engine. Weekday indices count 0 = Sunday … 6 = Saturday.
fn rule_from_payload(payload: &ExemptRulePayload) -> Result<ExemptDayRule, CadenceError> {
    match payload {
        ExemptRulePayload::Weekly(weekly) => weekday_from_index(weekly.weekday)
            .map(ExemptDayRule::Weekly)
            .ok_or_else(|| {
                CadenceError::InvalidArgument(format!(
                    "weekday {} outside 0..=6 (0 = Sunday)",
                    weekly.weekday
                ))
            }),
        ExemptRulePayload::Range(range) => Ok(ExemptDayRule::Range {
            start: range.start_date,
            end: range.end_date,
        }),
    }
}

fn rule_record(row: &DbExemptRule) -> Result<ExemptRuleRecord, CadenceError> {
    let rule = match row.to_rule()? {
        ExemptDayRule::Weekly(weekday) => ExemptRulePayload::Weekly(WeeklyRulePayload {
            weekday: weekday_to_index(weekday),
        }),
        ExemptDayRule::Range { start, end } => ExemptRulePayload::Range(RangeRulePayload {
            start_date: start,
            end_date: end,
        }),
    };
    Ok(ExemptRuleRecord { id: row.id, rule })
}

pub async fn list_rules(
    State(state): State<CadenceState>,
    Path(participant): Path<String>,
) -> Result<Json<ExemptRulesBody>, CadenceError> {
    let rows = state.processor.list_rules(&participant).await?;
    let rules = rows.iter().map(rule_record).collect::<Result<_, _>>()?;
    Ok(Json(ExemptRulesBody { rules }))
}

pub async fn add_rule(
    State(state): State<CadenceState>,
    Path(participant): Path<String>,
    Json(payload): Json<ExemptRulePayload>,
) -> Result<(StatusCode, Json<RuleCreatedBody>), CadenceError> {
    let rule = rule_from_payload(&payload)?;
    let id = state.processor.add_rule(&participant, rule).await?;
    Ok((StatusCode::CREATED, Json(RuleCreatedBody { id })))
}

pub async fn remove_rule(
    State(state): State<CadenceState>,
    Path((participant, rule_id)): Path<(String, i64)>,
) -> Result<StatusCode, CadenceError> {
    if state.processor.remove_rule(&participant, rule_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CadenceError::NotFound("exempt rule"))
    }
}

pub fn router() -> Router<CadenceState> {
    Router::new()
        .route(
            "/v1/participants/{participant}/exempt-rules",
            get(list_rules).post(add_rule),
        )
        .route(
            "/v1/participants/{participant}/exempt-rules/{rule_id}",
            delete(remove_rule),
        )
}
