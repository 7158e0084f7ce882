use staysafe_scamcheck::{app_config, build_router, initialize_app_state, CorsPolicy};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "staysafe_scamcheck=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = app_config::config();
    info!(
        "=== STARTING STAYSAFEBG SCAM CHECK API ({}) ===",
        config.environment
    );
    info!(
        "Database URL: {}",
        staysafe_scamcheck::db::mask_connection_string(&config.database_url)
    );

    let state = match initialize_app_state(config).await {
        Ok(state) => {
            info!("✓ Application state initialized successfully");
            state
        },
        Err(e) => {
            error!("✗ Failed to initialize application state: {}", e);
            return Err(anyhow::anyhow!("Initialization failed: {}", e));
        },
    };

    let app = build_router(
        state,
        CorsPolicy::from_config(config),
        config.enable_api_docs && !config.is_production(),
    );

    info!("Starting HTTP server on {}...", config.bind_address);
    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
