// HTTP handlers for the scam check backend

pub mod docs;
pub mod reports;
pub mod scam_check;
pub mod threat_check;

use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub use threat_check::threat_check_routes;

// Scam check routes
pub fn scam_check_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(scam_check::scam_check))
        .route("/recent", get(scam_check::recent_checks))
}

// Community report routes
pub fn reports_routes() -> Router<AppState> {
    Router::new().route("/recent", get(reports::recent_reports))
}
