// API documentation handlers
pub mod schemas;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

pub use schemas::ApiDoc;

/// Serve the OpenAPI JSON document at /api-docs/openapi.json
pub async fn serve_openapi_spec() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        build_openapi_spec(),
    )
        .into_response()
}

pub fn build_openapi_spec() -> String {
    ApiDoc::openapi().to_json().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_route() {
        let spec: serde_json::Value = serde_json::from_str(&build_openapi_spec()).unwrap();
        let paths = spec["paths"].as_object().unwrap();
        for path in [
            "/functions/v1/threat-check",
            "/api/v1/scam-check",
            "/api/v1/scam-check/recent",
            "/api/v1/reports/recent",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }
}
