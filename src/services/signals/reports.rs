// Community report matcher

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::models::check::{CheckInput, SourceResult, SourceType};
use crate::models::report::ReportSummary;
use crate::services::normalizer::report_search_terms;
use crate::services::signals::store::ReportStore;

pub const REPORTS_SOURCE: &str = "Community reports";
pub const REPORT_MATCH_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportMatchOutcome {
    pub matched: bool,
    pub matches: Vec<ReportSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportMatchOutcome {
    pub fn to_source(&self) -> SourceResult {
        if let Some(error) = &self.error {
            return SourceResult::unchecked(REPORTS_SOURCE, SourceType::Internal, error.clone());
        }
        if self.matched {
            SourceResult::checked(REPORTS_SOURCE, SourceType::Internal, true, 0.7)
                .with_reason(format!("{} approved report(s) mention this input", self.matches.len()))
        } else {
            SourceResult::checked(REPORTS_SOURCE, SourceType::Internal, false, 0.5)
                .with_reason("no approved reports")
        }
    }
}

#[derive(Clone)]
pub struct ReportMatcher {
    store: Arc<dyn ReportStore>,
}

impl ReportMatcher {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }

    /// Never fails: a store error degrades to an unmatched outcome
    pub async fn check(&self, input: &CheckInput) -> ReportMatchOutcome {
        let terms = report_search_terms(input);
        if terms.is_empty() {
            return ReportMatchOutcome::default();
        }

        match self.store.search_approved(&terms, REPORT_MATCH_LIMIT).await {
            Ok(mut matches) => {
                matches.truncate(REPORT_MATCH_LIMIT);
                debug!("report search over {} terms found {}", terms.len(), matches.len());
                ReportMatchOutcome {
                    matched: !matches.is_empty(),
                    matches,
                    error: None,
                }
            },
            Err(e) => {
                warn!("report lookup failed: {}", e);
                ReportMatchOutcome {
                    error: Some(e.to_string()),
                    ..ReportMatchOutcome::default()
                }
            },
        }
    }
}
