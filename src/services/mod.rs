// Services module for the scam check backend
// Business logic layer: classification, matching, aggregation

pub mod aggregator;
pub mod classifier;
pub mod heuristics;
pub mod normalizer;
pub mod recent_checks;
pub mod scam_check;
pub mod signals;
pub mod similarity;
pub mod threat_check_rpc;
pub mod threat_feeds;

// Re-export commonly used services
pub use aggregator::{aggregate, apply_overrides, InternalSignals};
pub use classifier::{classify, detect_input_type};
pub use recent_checks::{RecentCheck, RecentChecks};
pub use scam_check::{ScamCheckResult, ScamCheckService};
pub use signals::{
    MaliciousResourceMatcher, PgSignalStore, PhishingDomainMatcher, ReportMatcher, StoreError,
};
pub use threat_check_rpc::{
    HttpThreatCheckClient, InProcessThreatCheck, PipelineError, ThreatCheckRpc,
};
pub use threat_feeds::{ProviderError, ThreatFeedAggregator, ThreatProvider};
