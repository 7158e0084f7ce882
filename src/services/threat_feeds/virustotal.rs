// VirusTotal v3 URL report lookup

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::{ProviderError, ThreatProvider};
use crate::app_config::ThreatFeedConfig;
use crate::models::check::{SourceResult, SourceType};

pub const VIRUSTOTAL_SOURCE: &str = "VirusTotal";

#[derive(Clone)]
pub struct VirusTotalProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl VirusTotalProvider {
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
            config.virustotal_api_url.clone(),
            config.virustotal_api_key.clone(),
        )
    }
}

/// VirusTotal identifies a URL by its unpadded url-safe base64 encoding
pub fn url_id(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.as_bytes())
}

#[async_trait]
impl ThreatProvider for VirusTotalProvider {
    fn name(&self) -> &'static str {
        VIRUSTOTAL_SOURCE
    }

    async fn lookup(&self, url_candidate: &str) -> Result<SourceResult, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured)?;

        let endpoint = format!(
            "{}/urls/{}",
            self.api_url.trim_end_matches('/'),
            url_id(url_candidate)
        );
        let response = self
            .client
            .get(&endpoint)
            .header("x-apikey", api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(
                SourceResult::checked(VIRUSTOTAL_SOURCE, SourceType::External, false, 0.50)
                    .with_reason("Not listed"),
            );
        }
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        parse_response(&body)
    }
}

/// Reads `data.attributes.last_analysis_stats`
pub fn parse_response(body: &Value) -> Result<SourceResult, ProviderError> {
    let stats = body
        .pointer("/data/attributes/last_analysis_stats")
        .ok_or_else(|| ProviderError::Parse("missing last_analysis_stats".to_string()))?;

    let count = |key: &str| stats.get(key).and_then(Value::as_u64).unwrap_or(0);
    let malicious = count("malicious");
    let suspicious = count("suspicious");
    let harmless = count("harmless");
    let undetected = count("undetected");

    let details = json!({
        "malicious": malicious,
        "suspicious": suspicious,
        "harmless": harmless,
        "undetected": undetected,
    });

    let result = if malicious >= 1 {
        let confidence = (0.70 + 0.05 * malicious as f64).min(0.95);
        SourceResult::checked(VIRUSTOTAL_SOURCE, SourceType::External, true, confidence)
            .with_reason(format!("{} engine(s) report malicious", malicious))
    } else {
        SourceResult::checked(VIRUSTOTAL_SOURCE, SourceType::External, false, 0.65)
    };

    Ok(result.with_details(details))
}
