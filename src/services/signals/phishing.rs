// Trusted phishing-domain matcher: exact hit first, then trigram look-alikes

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::models::check::{CheckInput, SourceResult, SourceType};
use crate::models::malicious_resource::RiskLevel;
use crate::models::trusted_domain::PhishingDomainMatch;
use crate::services::normalizer::lookup_domain;
use crate::services::signals::store::PhishingDomainStore;

pub const PHISHING_SOURCE: &str = "Trusted phishing domains";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DomainMatchType {
    Exact,
    Similar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhishingMatchOutcome {
    pub matched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<DomainMatchType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub matches: Vec<PhishingDomainMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhishingMatchOutcome {
    /// The entry that decided the match
    pub fn top_match(&self) -> Option<&PhishingDomainMatch> {
        if self.matched {
            self.matches.first()
        } else {
            None
        }
    }

    /// High-risk list entries, or entries the curators are at least 90% sure of
    pub fn is_high_risk(&self) -> bool {
        self.top_match()
            .map(|top| top.risk_level == RiskLevel::High || top.confidence >= 0.9)
            .unwrap_or(false)
    }

    pub fn to_source(&self) -> SourceResult {
        if let Some(error) = &self.error {
            return SourceResult::unchecked(PHISHING_SOURCE, SourceType::Internal, error.clone());
        }
        if self.domain.is_none() {
            return SourceResult::unchecked(
                PHISHING_SOURCE,
                SourceType::Internal,
                "no domain to compare",
            );
        }
        match self.top_match() {
            Some(top) => {
                let how = match self.match_type {
                    Some(DomainMatchType::Exact) => "exact match".to_string(),
                    _ => format!("look-alike of {} (similarity {:.2})", top.domain, top.similarity),
                };
                SourceResult::checked(PHISHING_SOURCE, SourceType::Internal, true, top.confidence)
                    .with_reason(how)
            },
            None => SourceResult::checked(PHISHING_SOURCE, SourceType::Internal, false, 0.6)
                .with_reason("no listed or look-alike domain"),
        }
    }
}

#[derive(Clone)]
pub struct PhishingDomainMatcher {
    store: Arc<dyn PhishingDomainStore>,
    threshold: f64,
    max_results: usize,
}

impl PhishingDomainMatcher {
    pub fn new(store: Arc<dyn PhishingDomainStore>, threshold: f64, max_results: usize) -> Self {
        Self {
            store,
            threshold,
            max_results: max_results.max(1),
        }
    }

    /// Phone inputs never match; lookup failures degrade to unmatched
    pub async fn check(&self, input: &CheckInput) -> PhishingMatchOutcome {
        let domain = match lookup_domain(input) {
            Some(domain) => domain,
            None => return PhishingMatchOutcome::default(),
        };

        let mut error = None;

        match self.store.find_exact(&domain).await {
            Ok(Some(exact)) => {
                debug!("phishing list exact hit for {}", domain);
                return PhishingMatchOutcome {
                    matched: true,
                    match_type: Some(DomainMatchType::Exact),
                    domain: Some(domain),
                    matches: vec![exact],
                    error: None,
                };
            },
            Ok(None) => {},
            Err(e) => {
                warn!("phishing exact lookup failed: {}", e);
                error = Some(e.to_string());
            },
        }

        match self
            .store
            .find_similar(&domain, self.threshold, self.max_results)
            .await
        {
            Ok(mut matches) => {
                matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
                matches.truncate(self.max_results);
                let matched = matches
                    .first()
                    .map(|top| top.similarity >= self.threshold)
                    .unwrap_or(false);
                debug!(
                    "phishing similarity search for {} returned {} (matched: {})",
                    domain,
                    matches.len(),
                    matched
                );
                PhishingMatchOutcome {
                    matched,
                    match_type: matched.then_some(DomainMatchType::Similar),
                    domain: Some(domain),
                    matches,
                    error: None,
                }
            },
            Err(e) => {
                warn!("phishing similarity lookup failed: {}", e);
                PhishingMatchOutcome {
                    domain: Some(domain),
                    error: error.or_else(|| Some(e.to_string())),
                    ..PhishingMatchOutcome::default()
                }
            },
        }
    }
}
