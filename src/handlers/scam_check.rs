// Scam check endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use crate::{
    app::AppState,
    models::check::ScamCheckRequest,
    services::{RecentCheck, ScamCheckResult},
    utils::check_errors::{CheckError, CheckErrorResponse, CheckResult},
};

/// Run the full scam check pipeline for one input
/// POST /api/v1/scam-check
#[utoipa::path(
    post,
    path = "/api/v1/scam-check",
    tag = "Scam check",
    operation_id = "scamCheck",
    request_body = ScamCheckRequest,
    responses(
        (status = 200, description = "Verdict with every source that contributed", body = ScamCheckResult),
        (status = 400, description = "Empty, unclassifiable or oversized input", body = CheckErrorResponse)
    )
)]
pub async fn scam_check(
    State(state): State<AppState>,
    payload: Result<Json<ScamCheckRequest>, JsonRejection>,
) -> CheckResult<Json<ScamCheckResult>> {
    let Json(request) = payload.map_err(|e| CheckError::InvalidRequest(e.body_text()))?;
    request.validate()?;

    let result = state.scam_check.check(&request.input).await?;

    state
        .recent_checks
        .write()
        .await
        .record(&result.input, result.aggregate.verdict, result.checked_at);

    Ok(Json(result))
}

/// Most recent checks, newest first
/// GET /api/v1/scam-check/recent
#[utoipa::path(
    get,
    path = "/api/v1/scam-check/recent",
    tag = "Scam check",
    operation_id = "recentScamChecks",
    responses(
        (status = 200, description = "Recently checked inputs", body = [RecentCheck])
    )
)]
pub async fn recent_checks(State(state): State<AppState>) -> Json<Vec<RecentCheck>> {
    Json(state.recent_checks.read().await.list())
}
