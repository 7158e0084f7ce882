// Standalone threat-check function server. Needs only the provider keys.

use staysafe_scamcheck::{
    app_config::ThreatFeedConfig, handlers::threat_check_routes, ThreatFeedAggregator,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "staysafe_scamcheck=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ThreatFeedConfig::from_env()?;
    let aggregator = Arc::new(ThreatFeedAggregator::from_config(&config)?);

    let app = threat_check_routes(aggregator).layer(TraceLayer::new_for_http());

    let bind_address =
        std::env::var("THREAT_CHECK_BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8081".to_string());
    info!("Threat-check function listening on {}", bind_address);

    let listener = TcpListener::bind(&bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
