// Google Safe Browsing v4 threatMatches:find

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ProviderError, ThreatProvider};
use crate::app_config::ThreatFeedConfig;
use crate::models::check::{SourceResult, SourceType};

pub const SAFE_BROWSING_SOURCE: &str = "Google Safe Browsing";

const CLIENT_ID: &str = "staysafebg";
const CLIENT_VERSION: &str = "1.0.0";

#[derive(Clone)]
pub struct SafeBrowsingProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl SafeBrowsingProvider {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &ThreatFeedConfig) -> Self {
        Self::new(
            client,
            config.safe_browsing_api_url.clone(),
            config.safe_browsing_api_key.clone(),
        )
    }
}

pub fn request_body(url_candidate: &str) -> Value {
    json!({
        "client": {
            "clientId": CLIENT_ID,
            "clientVersion": CLIENT_VERSION,
        },
        "threatInfo": {
            "threatTypes": [
                "MALWARE",
                "SOCIAL_ENGINEERING",
                "UNWANTED_SOFTWARE",
                "POTENTIALLY_HARMFUL_APPLICATION"
            ],
            "platformTypes": ["ANY_PLATFORM"],
            "threatEntryTypes": ["URL"],
            "threatEntries": [{ "url": url_candidate }],
        },
    })
}

#[async_trait]
impl ThreatProvider for SafeBrowsingProvider {
    fn name(&self) -> &'static str {
        SAFE_BROWSING_SOURCE
    }

    async fn lookup(&self, url_candidate: &str) -> Result<SourceResult, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured)?;

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", api_key)])
            .json(&request_body(url_candidate))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        Ok(parse_response(&body))
    }
}

/// An empty object means no match
pub fn parse_response(body: &Value) -> SourceResult {
    match body.get("matches").and_then(Value::as_array) {
        Some(matches) if !matches.is_empty() => {
            let threat_types: Vec<&str> = matches
                .iter()
                .filter_map(|m| m.get("threatType").and_then(Value::as_str))
                .collect();
            SourceResult::checked(SAFE_BROWSING_SOURCE, SourceType::External, true, 0.92)
                .with_reason(threat_types.join(", "))
                .with_details(Value::Array(matches.clone()))
        },
        _ => SourceResult::checked(SAFE_BROWSING_SOURCE, SourceType::External, false, 0.67),
    }
}
