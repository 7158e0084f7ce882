// Community report feed

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::error;

use crate::{
    app::AppState,
    models::{check::RecentReportsQuery, report::ReportSummary},
    utils::check_errors::{CheckError, CheckErrorResponse, CheckResult},
};

/// Latest approved community reports
/// GET /api/v1/reports/recent
#[utoipa::path(
    get,
    path = "/api/v1/reports/recent",
    tag = "Reports",
    operation_id = "recentReports",
    params(RecentReportsQuery),
    responses(
        (status = 200, description = "Approved reports, newest first", body = [ReportSummary]),
        (status = 500, description = "Report store unavailable", body = CheckErrorResponse)
    )
)]
pub async fn recent_reports(
    State(state): State<AppState>,
    Query(query): Query<RecentReportsQuery>,
) -> CheckResult<Json<Vec<ReportSummary>>> {
    let limit = query.effective_limit() as usize;

    let reports = state.reports.recent_approved(limit).await.map_err(|e| {
        error!("Failed to load recent reports: {}", e);
        CheckError::Internal("Failed to load recent reports".to_string())
    })?;

    Ok(Json(reports))
}
