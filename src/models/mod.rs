pub mod check;
pub mod malicious_resource;
pub mod report;
pub mod trusted_domain;

// Re-export common types
pub use check::*;
pub use malicious_resource::{
    MaliciousResource, MaliciousResourceRow, ResourceStatus, ResourceType, RiskLevel,
};
pub use report::{ReportSummary, ScamReport};
pub use trusted_domain::{PhishingDomainMatch, SimilarDomainRow, TrustedPhishingDomain};
