// Threat-check RPC: the interactive pipeline's single call into the
// external-feed aggregator, either over HTTP or in process.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::check::{CheckInput, ThreatCheckRequest, ThreatCheckResponse};
use crate::services::threat_feeds::ThreatFeedAggregator;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("threat-check unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("threat-check returned HTTP {0}")]
    Status(u16),

    #[error("threat-check response unreadable: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ThreatCheckRpc: Send + Sync {
    async fn threat_check(&self, input: &CheckInput) -> Result<ThreatCheckResponse, PipelineError>;
}

/// Remote threat-check function
#[derive(Clone)]
pub struct HttpThreatCheckClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpThreatCheckClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("StaySafeBG-ScamCheck/1.0")
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ThreatCheckRpc for HttpThreatCheckClient {
    async fn threat_check(&self, input: &CheckInput) -> Result<ThreatCheckResponse, PipelineError> {
        let request = ThreatCheckRequest {
            input: Some(input.raw.clone()),
            input_type: Some(input.input_type),
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(PipelineError::Status(response.status().as_u16()));
        }

        let mut body: ThreatCheckResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Decode(e.to_string()))?;

        // Remote values are not trusted to hold the unchecked invariant
        body.aggregate.sources = body
            .aggregate
            .sources
            .into_iter()
            .map(|source| source.sanitized())
            .collect();

        debug!(
            "remote threat-check answered {} with {} sources",
            body.aggregate.verdict,
            body.aggregate.sources.len()
        );
        Ok(body)
    }
}

/// The aggregator called directly; never fails
#[derive(Clone)]
pub struct InProcessThreatCheck {
    aggregator: Arc<ThreatFeedAggregator>,
}

impl InProcessThreatCheck {
    pub fn new(aggregator: Arc<ThreatFeedAggregator>) -> Self {
        Self { aggregator }
    }
}

#[async_trait]
impl ThreatCheckRpc for InProcessThreatCheck {
    async fn threat_check(&self, input: &CheckInput) -> Result<ThreatCheckResponse, PipelineError> {
        Ok(self.aggregator.check_input(input).await)
    }
}
