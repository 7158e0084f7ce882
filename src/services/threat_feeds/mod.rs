// External threat-feed aggregator
//
// Asks every configured reputation provider about one URL candidate at the
// same time and folds the answers into an aggregate. A provider that fails,
// times out or is not configured contributes an unchecked source.

pub mod safe_browsing;
pub mod sinking_yachts;
pub mod urlhaus;
pub mod virustotal;

use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::app_config::ThreatFeedConfig;
use crate::models::check::{
    CheckInput, SourceResult, SourceType, ThreatCheckRequest, ThreatCheckResponse,
};
use crate::services::aggregator::aggregate;
use crate::services::classifier::detect_input_type;
use crate::services::normalizer::url_candidate;
use crate::utils::check_errors::CheckError;

pub use safe_browsing::SafeBrowsingProvider;
pub use sinking_yachts::SinkingYachtsProvider;
pub use urlhaus::UrlhausProvider;
pub use virustotal::VirusTotalProvider;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("No API key configured")]
    NotConfigured,

    #[error("Provider disabled")]
    Disabled,
}

// =============================================================================
// PROVIDER SEAM
// =============================================================================

/// One third-party reputation lookup
#[async_trait]
pub trait ThreatProvider: Send + Sync {
    /// Display name, also used as `SourceResult::source`
    fn name(&self) -> &'static str;

    /// Look up a normalized URL candidate
    async fn lookup(&self, url_candidate: &str) -> Result<SourceResult, ProviderError>;
}

/// Shared HTTP client for the provider calls
pub fn build_http_client(config: &ThreatFeedConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
}

// =============================================================================
// AGGREGATOR
// =============================================================================

#[derive(Clone)]
pub struct ThreatFeedAggregator {
    providers: Vec<Arc<dyn ThreatProvider>>,
    provider_timeout: Duration,
}

impl ThreatFeedAggregator {
    pub fn new(providers: Vec<Arc<dyn ThreatProvider>>, provider_timeout: Duration) -> Self {
        Self {
            providers,
            provider_timeout,
        }
    }

    /// All four providers, sharing one HTTP client
    pub fn from_config(config: &ThreatFeedConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        let providers: Vec<Arc<dyn ThreatProvider>> = vec![
            Arc::new(SinkingYachtsProvider::from_config(client.clone(), config)),
            Arc::new(UrlhausProvider::from_config(client.clone(), config)),
            Arc::new(VirusTotalProvider::from_config(client.clone(), config)),
            Arc::new(SafeBrowsingProvider::from_config(client, config)),
        ];

        info!(
            "Threat feeds configured: urlhaus={}, virustotal={}, safe_browsing={}, sinking_yachts={}",
            config.urlhaus_auth_key.is_some(),
            config.virustotal_api_key.is_some(),
            config.safe_browsing_api_key.is_some(),
            config.sinking_yachts_enabled
        );

        Ok(Self::new(
            providers,
            Duration::from_secs(config.provider_timeout_secs),
        ))
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Handle one threat-check request.
    ///
    /// Only a blank input is an error. Inputs without a URL candidate get the
    /// empty aggregate, which is `unknown` and degraded.
    #[instrument(skip(self, request))]
    pub async fn check(&self, request: &ThreatCheckRequest) -> Result<ThreatCheckResponse, CheckError> {
        let raw = request.input.as_deref().unwrap_or_default().trim();
        if raw.is_empty() {
            return Err(CheckError::EmptyInput);
        }

        let input = CheckInput {
            raw: raw.to_string(),
            input_type: request.input_type.unwrap_or_else(|| detect_input_type(raw)),
        };

        Ok(self.check_input(&input).await)
    }

    /// Fan out to every provider for an already classified input
    pub async fn check_input(&self, input: &CheckInput) -> ThreatCheckResponse {
        let candidate = url_candidate(input);

        let sources = match &candidate {
            Some(url) => self.lookup_all(url).await,
            None => {
                debug!("no url candidate for {} input", input.input_type);
                Vec::new()
            },
        };

        ThreatCheckResponse {
            input_type: input.input_type,
            url_candidate: candidate,
            aggregate: aggregate(&sources),
        }
    }

    /// Every provider result, in provider order
    pub async fn lookup_all(&self, url: &str) -> Vec<SourceResult> {
        let lookups = self
            .providers
            .iter()
            .map(|provider| run_provider(provider.as_ref(), url, self.provider_timeout));
        join_all(lookups).await
    }
}

/// One provider call under the timeout; failures become unchecked sources
async fn run_provider(provider: &dyn ThreatProvider, url: &str, limit: Duration) -> SourceResult {
    let name = provider.name();
    match tokio::time::timeout(limit, provider.lookup(url)).await {
        Ok(Ok(result)) => {
            debug!("{} answered: flagged={} confidence={}", name, result.flagged, result.confidence);
            result.sanitized()
        },
        Ok(Err(e)) => {
            match e {
                ProviderError::NotConfigured | ProviderError::Disabled => {
                    debug!("{} skipped: {}", name, e)
                },
                _ => warn!("{} lookup failed: {}", name, e),
            }
            SourceResult::unchecked(name, SourceType::External, e.to_string())
        },
        Err(_) => {
            warn!("{} timed out after {}s", name, limit.as_secs());
            SourceResult::unchecked(
                name,
                SourceType::External,
                format!("Timed out after {}s", limit.as_secs()),
            )
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::check::{InputType, Verdict};

    #[test]
    fn test_from_config_builds_all_providers() {
        let aggregator = ThreatFeedAggregator::from_config(&ThreatFeedConfig::default()).unwrap();
        assert_eq!(
            aggregator.provider_names(),
            vec!["phish.sinking.yachts", "URLhaus", "VirusTotal", "Google Safe Browsing"]
        );
        assert_eq!(aggregator.provider_timeout, Duration::from_secs(6));
    }

    #[test]
    fn test_invalid_user_agent_is_a_build_error() {
        let config = ThreatFeedConfig {
            user_agent: "bad\nagent".to_string(),
            ..ThreatFeedConfig::default()
        };
        assert!(build_http_client(&config).is_err());
        assert!(ThreatFeedAggregator::from_config(&config).is_err());
    }

    struct FixedProvider {
        name: &'static str,
        flagged: bool,
        confidence: f64,
    }

    #[async_trait]
    impl ThreatProvider for FixedProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn lookup(&self, _url: &str) -> Result<SourceResult, ProviderError> {
            Ok(SourceResult::checked(self.name, SourceType::External, self.flagged, self.confidence))
        }
    }

    /// `Some(status)` fails with that HTTP status, `None` is an unconfigured provider
    struct FailingProvider(Option<u16>);

    #[async_trait]
    impl ThreatProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "Failing"
        }

        async fn lookup(&self, _url: &str) -> Result<SourceResult, ProviderError> {
            Err(match self.0 {
                Some(code) => ProviderError::Status(code),
                None => ProviderError::NotConfigured,
            })
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl ThreatProvider for SlowProvider {
        fn name(&self) -> &'static str {
            "Slow"
        }

        async fn lookup(&self, _url: &str) -> Result<SourceResult, ProviderError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(SourceResult::checked("Slow", SourceType::External, true, 0.9))
        }
    }

    fn request(input: &str) -> ThreatCheckRequest {
        ThreatCheckRequest {
            input: Some(input.to_string()),
            input_type: None,
        }
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected() {
        let aggregator = ThreatFeedAggregator::new(vec![], Duration::from_secs(1));
        let result = aggregator.check(&request("   ")).await;
        assert_eq!(result.unwrap_err(), CheckError::EmptyInput);

        let result = aggregator.check(&ThreatCheckRequest::default()).await;
        assert_eq!(result.unwrap_err(), CheckError::EmptyInput);
    }

    #[tokio::test]
    async fn test_phone_input_short_circuits_to_unknown() {
        let provider = Arc::new(FixedProvider {
            name: "Fixed",
            flagged: true,
            confidence: 0.9,
        });
        let aggregator = ThreatFeedAggregator::new(vec![provider], Duration::from_secs(1));

        let response = aggregator.check(&request("0888123456")).await.unwrap();
        assert_eq!(response.input_type, InputType::Phone);
        assert!(response.url_candidate.is_none());
        assert_eq!(response.aggregate.verdict, Verdict::Unknown);
        assert!(response.aggregate.sources.is_empty());
        assert!(response.aggregate.degraded);
    }

    #[tokio::test]
    async fn test_failures_become_unchecked_sources() {
        let providers: Vec<Arc<dyn ThreatProvider>> = vec![
            Arc::new(FixedProvider {
                name: "Clean",
                flagged: false,
                confidence: 0.6,
            }),
            Arc::new(FailingProvider(Some(503))),
            Arc::new(FailingProvider(None)),
        ];
        let aggregator = ThreatFeedAggregator::new(providers, Duration::from_secs(1));

        let response = aggregator.check(&request("safe-example.org")).await.unwrap();
        assert_eq!(response.url_candidate.as_deref(), Some("https://safe-example.org/"));
        assert_eq!(response.aggregate.sources.len(), 3);
        assert_eq!(response.aggregate.sources[1].reason.as_deref(), Some("HTTP 503"));
        assert_eq!(
            response.aggregate.sources[2].reason.as_deref(),
            Some("No API key configured")
        );
        assert_eq!(response.aggregate.verdict, Verdict::Clean);
        assert_eq!(response.aggregate.external_checked_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let aggregator =
            ThreatFeedAggregator::new(vec![Arc::new(SlowProvider)], Duration::from_secs(2));

        let sources = aggregator.lookup_all("https://example.com/").await;
        assert_eq!(sources.len(), 1);
        assert!(!sources[0].checked);
        assert_eq!(sources[0].reason.as_deref(), Some("Timed out after 2s"));
    }

    #[tokio::test]
    async fn test_input_type_override_is_honored() {
        let provider = Arc::new(FixedProvider {
            name: "Fixed",
            flagged: false,
            confidence: 0.6,
        });
        let aggregator = ThreatFeedAggregator::new(vec![provider], Duration::from_secs(1));

        let response = aggregator
            .check(&ThreatCheckRequest {
                input: Some("scam@phish.example".to_string()),
                input_type: Some(InputType::Email),
            })
            .await
            .unwrap();
        assert_eq!(response.input_type, InputType::Email);
        assert_eq!(response.url_candidate.as_deref(), Some("https://phish.example/"));
    }
}
