// Application state shared across handlers
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    db::DieselPool,
    services::{
        signals::ReportStore, RecentChecks, ScamCheckService, ThreatFeedAggregator,
    },
};

#[derive(Clone)]
pub struct AppState {
    /// Absent when the stores are not backed by PostgreSQL (tests)
    pub diesel_pool: Option<DieselPool>,
    pub scam_check: Arc<ScamCheckService>,
    pub threat_feeds: Arc<ThreatFeedAggregator>,
    pub reports: Arc<dyn ReportStore>,
    pub recent_checks: Arc<RwLock<RecentChecks>>,
    pub max_connections: u32,
}
