// Threat-check function: the external-feed aggregator behind one POST.
// Carries its own permissive CORS headers so browsers can call it directly.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    middleware::cors::ALLOWED_HEADERS,
    models::check::{ThreatCheckRequest, ThreatCheckResponse},
    services::ThreatFeedAggregator,
    utils::check_errors::{CheckError, CheckErrorResponse},
};

pub const THREAT_CHECK_PATH: &str = "/functions/v1/threat-check";

/// Router serving only the threat-check function
pub fn threat_check_routes(aggregator: Arc<ThreatFeedAggregator>) -> Router {
    Router::new()
        .route(THREAT_CHECK_PATH, any(threat_check))
        .with_state(aggregator)
}

/// Check one input against every external provider
/// POST /functions/v1/threat-check
#[utoipa::path(
    post,
    path = "/functions/v1/threat-check",
    tag = "Threat check",
    operation_id = "threatCheck",
    request_body = ThreatCheckRequest,
    responses(
        (status = 200, description = "Aggregate of the external providers", body = ThreatCheckResponse),
        (status = 400, description = "Missing input or malformed body", body = CheckErrorResponse),
        (status = 405, description = "Method not allowed", body = CheckErrorResponse),
        (status = 500, description = "Unexpected failure", body = CheckErrorResponse)
    )
)]
pub async fn threat_check(
    State(aggregator): State<Arc<ThreatFeedAggregator>>,
    method: Method,
    body: Bytes,
) -> Response {
    let response = match method {
        Method::OPTIONS => (StatusCode::OK, "ok").into_response(),
        Method::POST => match run_check(&aggregator, &body).await {
            Ok(result) => Json(result).into_response(),
            Err(e) => {
                if matches!(e, CheckError::Internal(_)) {
                    error!("threat-check failed: {}", e);
                }
                e.into_response()
            },
        },
        _ => CheckError::MethodNotAllowed.into_response(),
    };

    with_cors_headers(response)
}

async fn run_check(
    aggregator: &ThreatFeedAggregator,
    body: &[u8],
) -> Result<ThreatCheckResponse, CheckError> {
    let request: ThreatCheckRequest = serde_json::from_slice(body)?;
    let result = aggregator.check(&request).await?;

    info!(
        "threat-check: type={} verdict={} checked={}/{}",
        result.input_type,
        result.aggregate.verdict,
        result.aggregate.external_checked_count,
        result.aggregate.external_source_count
    );
    Ok(result)
}

fn with_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}
