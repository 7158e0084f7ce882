// Internal signal sources: community reports and the curated block-lists

pub mod malicious;
pub mod phishing;
pub mod reports;
pub mod store;

pub use malicious::{MaliciousMatchOutcome, MaliciousResourceMatcher};
pub use phishing::{DomainMatchType, PhishingDomainMatcher, PhishingMatchOutcome};
pub use reports::{ReportMatchOutcome, ReportMatcher};
pub use store::{
    MaliciousResourceStore, PgSignalStore, PhishingDomainStore, ReportStore, StoreError,
};
