// phish.sinking.yachts community phishing block-list

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use super::{ProviderError, ThreatProvider};
use crate::app_config::ThreatFeedConfig;
use crate::models::check::{SourceResult, SourceType};

pub const SINKING_YACHTS_SOURCE: &str = "phish.sinking.yachts";

const FLAGGED_CONFIDENCE: f64 = 0.80;
const CLEAN_CONFIDENCE: f64 = 0.60;

#[derive(Clone)]
pub struct SinkingYachtsProvider {
    client: reqwest::Client,
    base_url: String,
    identity: Option<String>,
    enabled: bool,
}

impl SinkingYachtsProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, identity: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            identity,
            enabled: true,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &ThreatFeedConfig) -> Self {
        Self {
            enabled: config.sinking_yachts_enabled,
            ..Self::new(
                client,
                config.sinking_yachts_url.clone(),
                config.sinking_yachts_identity.clone(),
            )
        }
    }

    /// Look up a bare hostname. A 404 means the host is not listed.
    pub async fn lookup_host(&self, hostname: &str) -> Result<SourceResult, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::Disabled);
        }

        let endpoint = format!("{}/{}", self.base_url.trim_end_matches('/'), hostname);
        let mut request = self
            .client
            .get(&endpoint)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(identity) = &self.identity {
            request = request.header("X-Identity", identity);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(not_listed());
        }
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        Ok(parse_response(&body))
    }
}

#[async_trait]
impl ThreatProvider for SinkingYachtsProvider {
    fn name(&self) -> &'static str {
        SINKING_YACHTS_SOURCE
    }

    async fn lookup(&self, url_candidate: &str) -> Result<SourceResult, ProviderError> {
        let hostname = hostname_of(url_candidate)?;
        self.lookup_host(&hostname).await
    }
}

pub fn hostname_of(url_candidate: &str) -> Result<String, ProviderError> {
    Url::parse(url_candidate)
        .ok()
        .and_then(|url| url.host_str().map(str::to_lowercase))
        .ok_or_else(|| ProviderError::Parse(format!("no hostname in {}", url_candidate)))
}

fn not_listed() -> SourceResult {
    SourceResult::checked(SINKING_YACHTS_SOURCE, SourceType::External, false, CLEAN_CONFIDENCE)
        .with_reason("Not listed")
}

/// The API answers with a bare boolean, an object with `phish`, or an array of
/// entries carrying `phish` / `in_database`.
pub fn is_listed(body: &Value) -> bool {
    match body {
        Value::Bool(listed) => *listed,
        Value::Array(entries) => entries.iter().any(|entry| {
            truthy(entry.get("phish")) || truthy(entry.get("in_database"))
        }),
        Value::Object(map) => map.get("phish").and_then(Value::as_bool).unwrap_or(false),
        _ => false,
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        _ => false,
    }
}

pub fn parse_response(body: &Value) -> SourceResult {
    let flagged = is_listed(body);
    let confidence = if flagged {
        FLAGGED_CONFIDENCE
    } else {
        CLEAN_CONFIDENCE
    };
    SourceResult::checked(SINKING_YACHTS_SOURCE, SourceType::External, flagged, confidence)
        .with_details(body.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_boolean_body() {
        assert!(is_listed(&json!(true)));
        assert!(!is_listed(&json!(false)));
    }

    #[test]
    fn test_object_body() {
        assert!(is_listed(&json!({"phish": true})));
        assert!(!is_listed(&json!({"phish": false})));
        assert!(!is_listed(&json!({"status": "ok"})));
    }

    #[test]
    fn test_array_body() {
        assert!(is_listed(&json!([{"phish": false}, {"in_database": true}])));
        assert!(!is_listed(&json!([{"phish": false}, {"in_database": 0}])));
        assert!(!is_listed(&json!([])));
    }

    #[test]
    fn test_parse_response_confidence() {
        let flagged = parse_response(&json!(true));
        assert!(flagged.checked && flagged.flagged);
        assert_eq!(flagged.confidence, 0.80);

        let clean = parse_response(&json!({"phish": false}));
        assert!(clean.checked && !clean.flagged);
        assert_eq!(clean.confidence, 0.60);
    }

    #[test]
    fn test_hostname_of() {
        assert_eq!(
            hostname_of("https://Login.Example.com/path?q=1").unwrap(),
            "login.example.com"
        );
        assert!(hostname_of("not a url").is_err());
    }

    #[tokio::test]
    async fn test_disabled_provider_is_not_called() {
        let config = ThreatFeedConfig {
            sinking_yachts_enabled: false,
            ..ThreatFeedConfig::default()
        };
        let provider = SinkingYachtsProvider::from_config(reqwest::Client::new(), &config);
        let result = provider.lookup("https://example.com/").await;
        assert!(matches!(result, Err(ProviderError::Disabled)));
    }
}
