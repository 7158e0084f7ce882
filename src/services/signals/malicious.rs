// Curated malicious-resource matcher

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::models::check::{CheckInput, NormalizedTerm, SourceResult, SourceType};
use crate::models::malicious_resource::{MaliciousResource, RiskLevel};
use crate::services::normalizer::resource_candidates;
use crate::services::signals::store::MaliciousResourceStore;

pub const MALICIOUS_SOURCE: &str = "Malicious resources list";
pub const RESOURCE_MATCH_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaliciousMatchOutcome {
    pub matched: bool,
    pub matches: Vec<MaliciousResource>,
    pub candidates: Vec<NormalizedTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MaliciousMatchOutcome {
    /// Highest curated risk among the matches
    pub fn highest_risk(&self) -> Option<RiskLevel> {
        self.matches
            .iter()
            .map(|resource| resource.risk_level)
            .max_by_key(RiskLevel::rank)
    }

    pub fn to_source(&self) -> SourceResult {
        if let Some(error) = &self.error {
            return SourceResult::unchecked(MALICIOUS_SOURCE, SourceType::Internal, error.clone());
        }
        match self.matches.first() {
            Some(top) => SourceResult::checked(MALICIOUS_SOURCE, SourceType::Internal, true, top.confidence)
                .with_reason(format!(
                    "listed as {} risk{}",
                    top.risk_level,
                    top.threat_name
                        .as_deref()
                        .map(|name| format!(" ({})", name))
                        .unwrap_or_default()
                )),
            None => SourceResult::checked(MALICIOUS_SOURCE, SourceType::Internal, false, 0.6)
                .with_reason("not listed"),
        }
    }
}

#[derive(Clone)]
pub struct MaliciousResourceMatcher {
    store: Arc<dyn MaliciousResourceStore>,
}

impl MaliciousResourceMatcher {
    pub fn new(store: Arc<dyn MaliciousResourceStore>) -> Self {
        Self { store }
    }

    pub async fn check(&self, input: &CheckInput) -> MaliciousMatchOutcome {
        let candidates = resource_candidates(input);
        if candidates.is_empty() {
            return MaliciousMatchOutcome::default();
        }

        match self.store.find_active(&candidates, RESOURCE_MATCH_LIMIT).await {
            Ok(mut matches) => {
                matches.truncate(RESOURCE_MATCH_LIMIT);
                debug!(
                    "malicious lookup over {} candidates found {}",
                    candidates.len(),
                    matches.len()
                );
                MaliciousMatchOutcome {
                    matched: !matches.is_empty(),
                    matches,
                    candidates,
                    error: None,
                }
            },
            Err(e) => {
                warn!("malicious resource lookup failed: {}", e);
                MaliciousMatchOutcome {
                    candidates,
                    error: Some(e.to_string()),
                    ..MaliciousMatchOutcome::default()
                }
            },
        }
    }
}
