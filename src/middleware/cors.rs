use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, HeaderMap, HeaderValue},
        Method, Request, Response, StatusCode,
    },
    middleware::Next,
};
use std::sync::Arc;
use tracing::debug;

use crate::app_config::AppConfig;

/// Headers the browser client and the threat-check caller send
pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Which origins the API answers with CORS headers
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    reflect_wildcard: bool,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>, reflect_wildcard: bool) -> Self {
        Self {
            allowed_origins,
            reflect_wildcard,
        }
    }

    /// Wildcard origins are reflected outside production only
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.cors_allowed_origins.clone(), !config.is_production())
    }

    pub fn permissive() -> Self {
        Self::new(vec!["*".to_string()], true)
    }

    pub fn allowed_origin(&self, origin: Option<&str>) -> Option<String> {
        let origin = origin?;
        let has_wildcard = self.allowed_origins.iter().any(|o| o == "*");

        if has_wildcard && self.reflect_wildcard {
            debug!("CORS: Reflecting origin: {}", origin);
            Some(origin.to_string())
        } else if self.allowed_origins.iter().any(|o| o == origin) {
            debug!("CORS: Origin allowed from whitelist: {}", origin);
            Some(origin.to_string())
        } else {
            debug!("CORS: Origin not in whitelist: {}", origin);
            None
        }
    }
}

fn insert_cors_headers(headers: &mut HeaderMap, allowed: &str) {
    if let Ok(value) = HeaderValue::from_str(allowed) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    }
}

/// CORS for the `/api` routes, answering pre-flight requests directly
pub async fn dynamic_cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response<Body>, StatusCode> {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let allowed_origin = policy.allowed_origin(origin.as_deref());

    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());

        if let Some(allowed) = &allowed_origin {
            let headers = response.headers_mut();
            insert_cors_headers(headers, allowed);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, POST, OPTIONS"),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOWED_HEADERS),
            );
            headers.insert(
                header::ACCESS_CONTROL_MAX_AGE,
                HeaderValue::from_static("3600"),
            );
        }

        *response.status_mut() = StatusCode::OK;
        return Ok(response);
    }

    let mut response = next.run(req).await;

    if let Some(allowed) = &allowed_origin {
        insert_cors_headers(response.headers_mut(), allowed);
    }

    Ok(response)
}
