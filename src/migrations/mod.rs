// Migration orchestrator for the scam check backend
// Embedded in the application binary for distroless container compatibility

pub mod diesel;

use std::error::Error;
use tracing::{error, info};

/// Configuration for migration execution
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub database_url: String,
    pub skip_diesel: bool,
    pub environment: String,
}

impl MigrationConfig {
    pub fn from_config(config: &crate::app_config::AppConfig) -> Self {
        Self {
            database_url: config.database_url.clone(),
            skip_diesel: config.disable_embedded_migrations,
            environment: config.environment.to_string(),
        }
    }
}

/// Run the PostgreSQL migrations unless disabled
pub async fn run_all_migrations(config: MigrationConfig) -> Result<usize, Box<dyn Error + Send + Sync>> {
    info!(
        "[MIGRATIONS] Starting migration process for environment: {}",
        config.environment
    );

    if config.skip_diesel {
        info!("[MIGRATIONS] Skipping Diesel migrations (disabled in config)");
        return Ok(0);
    }

    match diesel::run_migrations(&config.database_url).await {
        Ok(0) => {
            info!("[MIGRATIONS] ✓ Diesel migrations up to date");
            Ok(0)
        },
        Ok(applied_count) => {
            info!("[MIGRATIONS] ✓ Applied {} Diesel migrations", applied_count);
            Ok(applied_count)
        },
        Err(e) => {
            error!("[MIGRATIONS] ✗ Diesel migration failed: {}", e);
            Err(format!("Diesel migration failed: {}", e).into())
        },
    }
}

/// Check if migrations should run based on configuration
pub fn should_run_migrations(config: &crate::app_config::AppConfig) -> bool {
    !config.disable_embedded_migrations
}
