// OpenAPI schema definitions

use utoipa::OpenApi;

use crate::models::check::{
    AggregateResult, InputType, NormalizedTerm, RecentReportsQuery, ScamCheckRequest,
    SourceResult, SourceType, TermKind, ThreatCheckRequest, ThreatCheckResponse, Verdict,
};
use crate::models::malicious_resource::{MaliciousResource, ResourceStatus, ResourceType, RiskLevel};
use crate::models::report::ReportSummary;
use crate::models::trusted_domain::PhishingDomainMatch;
use crate::services::recent_checks::RecentCheck;
use crate::services::scam_check::ScamCheckResult;
use crate::services::signals::{
    DomainMatchType, MaliciousMatchOutcome, PhishingMatchOutcome, ReportMatchOutcome,
};
use crate::utils::check_errors::CheckErrorResponse;

/// utoipa OpenAPI document for the scam check endpoints
#[derive(OpenApi)]
#[openapi(
    info(
        title = "StaySafeBG Scam Check API",
        description = "Checks links, emails and phone numbers against community reports, curated block-lists and external threat feeds",
        version = "1.0.0"
    ),
    paths(
        crate::handlers::threat_check::threat_check,
        crate::handlers::scam_check::scam_check,
        crate::handlers::scam_check::recent_checks,
        crate::handlers::reports::recent_reports,
    ),
    components(
        schemas(
            InputType,
            TermKind,
            NormalizedTerm,
            SourceType,
            SourceResult,
            Verdict,
            AggregateResult,
            ThreatCheckRequest,
            ThreatCheckResponse,
            ScamCheckRequest,
            ScamCheckResult,
            RecentReportsQuery,
            RecentCheck,
            ReportSummary,
            ReportMatchOutcome,
            ResourceType,
            ResourceStatus,
            RiskLevel,
            MaliciousResource,
            MaliciousMatchOutcome,
            DomainMatchType,
            PhishingDomainMatch,
            PhishingMatchOutcome,
            CheckErrorResponse,
        )
    ),
    tags(
        (name = "Threat check", description = "External threat-feed aggregation"),
        (name = "Scam check", description = "Full scam check pipeline"),
        (name = "Reports", description = "Community report feed")
    )
)]
pub struct ApiDoc;
