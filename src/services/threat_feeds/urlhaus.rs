// URLhaus (abuse.ch) malware URL lookup

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{ProviderError, ThreatProvider};
use crate::app_config::ThreatFeedConfig;
use crate::models::check::{SourceResult, SourceType};

pub const URLHAUS_SOURCE: &str = "URLhaus";

#[derive(Debug, Default, Deserialize)]
pub struct UrlhausResponse {
    pub query_status: Option<String>,
    pub url_status: Option<String>,
    pub threat: Option<String>,
}

#[derive(Clone)]
pub struct UrlhausProvider {
    client: reqwest::Client,
    api_url: String,
    auth_key: Option<String>,
}

impl UrlhausProvider {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>, auth_key: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            auth_key,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &ThreatFeedConfig) -> Self {
        Self::new(
            client,
            config.urlhaus_api_url.clone(),
            config.urlhaus_auth_key.clone(),
        )
    }
}

#[async_trait]
impl ThreatProvider for UrlhausProvider {
    fn name(&self) -> &'static str {
        URLHAUS_SOURCE
    }

    async fn lookup(&self, url_candidate: &str) -> Result<SourceResult, ProviderError> {
        let auth_key = self.auth_key.as_deref().ok_or(ProviderError::NotConfigured)?;

        let response = self
            .client
            .post(&self.api_url)
            .header("Auth-Key", auth_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("url", url_candidate)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body: UrlhausResponse = response.json().await?;
        parse_response(&body)
    }
}

/// `ok` means the URL is in the database; `no_results` means it is not.
/// Anything else (`invalid_url`, ...) is not an answer.
pub fn parse_response(body: &UrlhausResponse) -> Result<SourceResult, ProviderError> {
    let details = json!({
        "query_status": body.query_status,
        "url_status": body.url_status,
        "threat": body.threat,
    });

    match body.query_status.as_deref() {
        Some("ok") => {
            let online = body.url_status.as_deref() == Some("online");
            let confidence = if online { 0.88 } else { 0.70 };
            Ok(
                SourceResult::checked(URLHAUS_SOURCE, SourceType::External, true, confidence)
                    .with_details(details),
            )
        },
        Some("no_results") => Ok(SourceResult::checked(
            URLHAUS_SOURCE,
            SourceType::External,
            false,
            0.58,
        )
        .with_details(details)),
        Some(other) => Err(ProviderError::Parse(format!("query_status {}", other))),
        None => Err(ProviderError::Parse("missing query_status".to_string())),
    }
}
