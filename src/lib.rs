// Library exports for the StaySafeBG scam check backend
// This file exposes modules and functions for library consumers

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use db::DieselPool;
pub use middleware::CorsPolicy;
pub use models::check::{AggregateResult, InputType, SourceResult, SourceType, Verdict};
pub use services::{
    RecentChecks, ScamCheckResult, ScamCheckService, ThreatCheckRpc, ThreatFeedAggregator,
};
pub use utils::check_errors::CheckError;

use services::signals::{
    MaliciousResourceMatcher, PgSignalStore, PhishingDomainMatcher, ReportMatcher,
};
use services::threat_feeds::SinkingYachtsProvider;
use services::{HttpThreatCheckClient, InProcessThreatCheck};

/// Wire the pipeline from configuration and a pool
pub fn build_scam_check_service(
    config: &AppConfig,
    pool: DieselPool,
    threat_feeds: Arc<ThreatFeedAggregator>,
) -> Result<ScamCheckService, reqwest::Error> {
    let store = Arc::new(PgSignalStore::new(pool));

    let threat_check: Arc<dyn ThreatCheckRpc> = match &config.scam_check.threat_check_url {
        Some(url) => {
            info!("Using remote threat-check at {}", url);
            Arc::new(HttpThreatCheckClient::new(
                url.clone(),
                Duration::from_secs(config.scam_check.threat_check_timeout_secs),
            )?)
        },
        None => {
            info!("Using in-process threat-check");
            Arc::new(InProcessThreatCheck::new(threat_feeds))
        },
    };

    let fallback = SinkingYachtsProvider::from_config(
        services::threat_feeds::build_http_client(&config.threat_feeds)?,
        &config.threat_feeds,
    );

    Ok(ScamCheckService::new(
        ReportMatcher::new(store.clone()),
        MaliciousResourceMatcher::new(store.clone()),
        PhishingDomainMatcher::new(
            store,
            config.scam_check.phishing_similarity_threshold,
            config.scam_check.phishing_similarity_max_results,
        ),
        threat_check,
    )
    .with_fallback(Arc::new(fallback)))
}

// Library initialization function for the server binary
pub async fn initialize_app_state(
    config: &AppConfig,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    info!("Initializing database pool...");
    let db_config = db::DieselDatabaseConfig::from(&config.database);
    let max_connections = db_config.max_connections;
    let diesel_pool = db::create_diesel_pool(db_config).await?;

    if migrations::should_run_migrations(config) {
        info!("Running embedded migrations...");
        migrations::run_all_migrations(migrations::MigrationConfig::from_config(config))
            .await
            .map_err(|e| format!("Migration failed: {}", e))?;
    } else {
        match migrations::diesel::check_migration_status(&config.database_url).await {
            Ok(status) if !status.is_up_to_date() => warn!(
                "Embedded migrations disabled with {} pending: {:?}",
                status.pending_count, status.pending_migrations
            ),
            Ok(status) => info!("Schema up to date ({} migrations applied)", status.applied_count),
            Err(e) => warn!("Could not read migration status: {}", e),
        }
    }

    let threat_feeds = Arc::new(ThreatFeedAggregator::from_config(&config.threat_feeds)?);
    let scam_check = Arc::new(build_scam_check_service(
        config,
        diesel_pool.clone(),
        threat_feeds.clone(),
    )?);

    Ok(AppState {
        diesel_pool: Some(diesel_pool.clone()),
        scam_check,
        threat_feeds,
        reports: Arc::new(PgSignalStore::new(diesel_pool)),
        recent_checks: Arc::new(RwLock::new(RecentChecks::new(
            config.scam_check.recent_checks_capacity,
        ))),
        max_connections,
    })
}

/// Full HTTP surface: API routes behind CORS, the threat-check function, health and docs
pub fn build_router(state: AppState, cors: CorsPolicy, enable_api_docs: bool) -> Router {
    let threat_feeds = state.threat_feeds.clone();

    let api = Router::new()
        .nest("/api/v1/scam-check", handlers::scam_check_routes())
        .nest("/api/v1/reports", handlers::reports_routes())
        .layer(from_fn_with_state(
            Arc::new(cors),
            middleware::dynamic_cors_middleware,
        ));

    let mut router = Router::new()
        .merge(api)
        .route("/health", get(health_check));

    if enable_api_docs {
        router = router.route("/api-docs/openapi.json", get(handlers::docs::serve_openapi_spec));
    }

    router
        .with_state(state)
        .merge(handlers::threat_check_routes(threat_feeds))
        .layer(TraceLayer::new_for_http())
}

// Health check handler
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    use axum::http::StatusCode;
    use axum::Json;

    let timestamp = chrono::Utc::now().to_rfc3339();

    let (overall_healthy, postgres_health) = match &state.diesel_pool {
        Some(pool) => match db::check_diesel_health(pool).await {
            Ok(_) => (
                true,
                serde_json::json!({
                    "status": "healthy",
                    "max_connections": state.max_connections,
                    "error": null
                }),
            ),
            Err(e) => (
                false,
                serde_json::json!({
                    "status": "unhealthy",
                    "error": format!("Database connection failed: {}", e)
                }),
            ),
        },
        None => (
            false,
            serde_json::json!({
                "status": "unhealthy",
                "error": "Database not configured"
            }),
        ),
    };

    let response = serde_json::json!({
        "status": if overall_healthy { "healthy" } else { "degraded" },
        "service": "staysafe-scamcheck",
        "timestamp": timestamp,
        "components": {
            "postgresql": postgres_health,
            "threat_feeds": state.threat_feeds.provider_names(),
        }
    });

    if overall_healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
