// Scam check pipeline
//
// Classify the input, fan out to the internal matchers and the threat-check
// RPC at once, score external + heuristic evidence, then layer the internal
// overrides on top.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::models::check::{
    AggregateResult, CheckInput, InputType, SourceResult, SourceType,
};
use crate::services::aggregator::{aggregate, apply_overrides, degrade, InternalSignals};
use crate::services::classifier::classify;
use crate::services::heuristics;
use crate::services::normalizer::url_candidate;
use crate::services::signals::{
    MaliciousMatchOutcome, MaliciousResourceMatcher, PhishingDomainMatcher, PhishingMatchOutcome,
    ReportMatchOutcome, ReportMatcher,
};
use crate::services::threat_check_rpc::{PipelineError, ThreatCheckRpc};
use crate::services::threat_feeds::ThreatProvider;
use crate::utils::check_errors::CheckError;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Confidence ceilings for the direct fallback lookup
const FALLBACK_FLAGGED_CAP: f64 = 0.7;
const FALLBACK_CLEAN_CAP: f64 = 0.5;

// =============================================================================
// TYPES
// =============================================================================

/// Full outcome of one scam check
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScamCheckResult {
    pub input: String,
    pub input_type: InputType,
    pub url_candidate: Option<String>,
    pub is_suspicious: bool,
    #[serde(flatten)]
    pub aggregate: AggregateResult,
    pub internal_sources: Vec<SourceResult>,
    pub database: ReportMatchOutcome,
    pub malicious_resources: MaliciousMatchOutcome,
    pub trusted_domains: PhishingMatchOutcome,
    pub used_fallback: bool,
    pub checked_at: DateTime<Utc>,
}

// =============================================================================
// SERVICE
// =============================================================================

#[derive(Clone)]
pub struct ScamCheckService {
    reports: ReportMatcher,
    malicious: MaliciousResourceMatcher,
    phishing: PhishingDomainMatcher,
    threat_check: Arc<dyn ThreatCheckRpc>,
    fallback: Option<Arc<dyn ThreatProvider>>,
}

impl ScamCheckService {
    pub fn new(
        reports: ReportMatcher,
        malicious: MaliciousResourceMatcher,
        phishing: PhishingDomainMatcher,
        threat_check: Arc<dyn ThreatCheckRpc>,
    ) -> Self {
        Self {
            reports,
            malicious,
            phishing,
            threat_check,
            fallback: None,
        }
    }

    /// Provider asked directly when the threat-check RPC cannot be reached
    pub fn with_fallback(mut self, provider: Arc<dyn ThreatProvider>) -> Self {
        self.fallback = Some(provider);
        self
    }

    /// Run the whole pipeline for one raw submission.
    ///
    /// Only input errors are returned; every lookup failure ends up as
    /// unchecked evidence in the result.
    #[instrument(skip(self, raw))]
    pub async fn check(&self, raw: &str) -> Result<ScamCheckResult, CheckError> {
        let input = classify(raw)?;
        debug!("checking {} input {:?}", input.input_type, input.raw);

        let (database, malicious_resources, trusted_domains, remote) = tokio::join!(
            self.reports.check(&input),
            self.malicious.check(&input),
            self.phishing.check(&input),
            self.threat_check.threat_check(&input),
        );

        let assessment = heuristics::assess(&input.raw, input.input_type);

        let (candidate, mut scored, used_fallback) = match remote {
            Ok(response) => (response.url_candidate, response.aggregate.sources, false),
            Err(e) => {
                warn!("threat-check unavailable, using fallback: {}", e);
                let sources = self.fallback_sources(&input, &e).await;
                (url_candidate(&input), sources, true)
            },
        };

        // a remote deployment may already score the heuristic itself
        let remote_has_heuristic = scored.iter().any(|s| s.source_type == SourceType::Heuristic);
        if let Some(assessment) = assessment.as_ref().filter(|_| !remote_has_heuristic) {
            scored.push(assessment.result.clone());
        }

        let base = aggregate(&scored);
        let base = if used_fallback { degrade(base) } else { base };

        let signals = InternalSignals {
            heuristic_critical: assessment.as_ref().map(|a| a.critical).unwrap_or(false),
            report_matched: database.matched,
            malicious_risk: if malicious_resources.matched {
                malicious_resources.highest_risk()
            } else {
                None
            },
            phishing_match: trusted_domains
                .matched
                .then(|| trusted_domains.is_high_risk()),
        };
        let final_aggregate = apply_overrides(base, &signals);

        info!(
            "scam check finished: type={} verdict={} score={} degraded={} fallback={}",
            input.input_type,
            final_aggregate.verdict,
            final_aggregate.risk_score,
            final_aggregate.degraded,
            used_fallback
        );

        let internal_sources = vec![
            database.to_source(),
            malicious_resources.to_source(),
            trusted_domains.to_source(),
        ];

        Ok(ScamCheckResult {
            input: input.raw,
            input_type: input.input_type,
            url_candidate: candidate,
            is_suspicious: final_aggregate.verdict.is_suspicious(),
            aggregate: final_aggregate,
            internal_sources,
            database,
            malicious_resources,
            trusted_domains,
            used_fallback,
            checked_at: Utc::now(),
        })
    }

    /// Direct single-provider lookup with capped confidence
    async fn fallback_sources(&self, input: &CheckInput, error: &PipelineError) -> Vec<SourceResult> {
        let (provider, candidate) = match (&self.fallback, url_candidate(input)) {
            (Some(provider), Some(candidate)) => (provider, candidate),
            _ => return Vec::new(),
        };

        let source = match provider.lookup(&candidate).await {
            Ok(result) => {
                let result = result.sanitized();
                let cap = if result.flagged {
                    FALLBACK_FLAGGED_CAP
                } else {
                    FALLBACK_CLEAN_CAP
                };
                let outcome = result.reason.clone().unwrap_or_else(|| {
                    let listed = if result.flagged { "listed" } else { "not listed" };
                    listed.to_string()
                });
                SourceResult {
                    confidence: result.confidence.min(cap),
                    reason: Some(fallback_reason(error, &outcome)),
                    ..result
                }
            },
            Err(e) => {
                warn!("fallback {} lookup failed: {}", provider.name(), e);
                SourceResult::unchecked(
                    provider.name(),
                    SourceType::External,
                    fallback_reason(error, &e.to_string()),
                )
            },
        };

        vec![source]
    }
}

fn fallback_reason(edge: &PipelineError, source: &str) -> String {
    format!("Fallback direct check (edge: {}; source: {})", edge, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_reason_names_both_failures() {
        let reason = fallback_reason(&PipelineError::Status(502), "Not listed");
        assert_eq!(
            reason,
            "Fallback direct check (edge: threat-check returned HTTP 502; source: Not listed)"
        );
    }
}
