// Scam check data model
// Shared by the threat-check RPC, the signal matchers and the verdict engine

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

// =============================================================================
// INPUT
// =============================================================================

/// What kind of identifier a user submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Url,
    Email,
    Phone,
    Unknown,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Url => "url",
            InputType::Email => "email",
            InputType::Phone => "phone",
            InputType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trimmed user submission together with its detected type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInput {
    pub raw: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
}

// =============================================================================
// NORMALIZED TERMS
// =============================================================================

/// Comparison scope of a normalized term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Url,
    Domain,
    Ip,
    Hash,
    Other,
}

/// Canonical lookup key derived from an input or a stored resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct NormalizedTerm {
    pub value: String,
    pub kind: TermKind,
}

impl NormalizedTerm {
    pub fn new(value: impl Into<String>, kind: TermKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }
}

// =============================================================================
// SOURCE RESULTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Internal,
    External,
    Heuristic,
}

/// One signal produced by one checker.
///
/// An unchecked source carries no evidence: `flagged` is false and
/// `confidence` is zero. Use the constructors, or [`SourceResult::sanitized`]
/// for values that arrive over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceResult {
    pub source: String,
    pub source_type: SourceType,
    pub checked: bool,
    pub flagged: bool,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl SourceResult {
    /// A source that produced a usable answer
    pub fn checked(
        source: impl Into<String>,
        source_type: SourceType,
        flagged: bool,
        confidence: f64,
    ) -> Self {
        Self {
            source: source.into(),
            source_type,
            checked: true,
            flagged,
            confidence: clamp_confidence(confidence),
            reason: None,
            details: None,
        }
    }

    /// A source that could not answer (missing key, timeout, bad status...)
    pub fn unchecked(
        source: impl Into<String>,
        source_type: SourceType,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_type,
            checked: false,
            flagged: false,
            confidence: 0.0,
            reason: Some(reason.into()),
            details: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Re-establish the unchecked-means-no-evidence invariant
    pub fn sanitized(mut self) -> Self {
        if self.checked {
            self.confidence = clamp_confidence(self.confidence);
        } else {
            self.flagged = false;
            self.confidence = 0.0;
        }
        self
    }

    pub fn is_flagged(&self) -> bool {
        self.checked && self.flagged
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// =============================================================================
// VERDICT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Clean,
    Warning,
    Danger,
    Unknown,
}

impl Verdict {
    /// Ordering used when policy rules raise a verdict.
    /// `unknown` sits above `clean`: an inconclusive check is never safer than a clean one.
    pub fn severity(&self) -> u8 {
        match self {
            Verdict::Clean => 0,
            Verdict::Unknown => 1,
            Verdict::Warning => 2,
            Verdict::Danger => 3,
        }
    }

    /// Raise to at least `floor`, never lower
    pub fn at_least(self, floor: Verdict) -> Verdict {
        if floor.severity() > self.severity() {
            floor
        } else {
            self
        }
    }

    pub fn is_suspicious(&self) -> bool {
        !matches!(self, Verdict::Clean)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Clean => "clean",
            Verdict::Warning => "warning",
            Verdict::Danger => "danger",
            Verdict::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// AGGREGATE
// =============================================================================

/// Combined outcome of every scored source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub verdict: Verdict,
    pub risk_score: u8,
    pub checked_count: usize,
    pub flagged_count: usize,
    pub external_checked_count: usize,
    pub external_source_count: usize,
    pub degraded: bool,
    pub warnings: Vec<String>,
    pub sources: Vec<SourceResult>,
}

// =============================================================================
// THREAT CHECK WIRE FORMAT
// =============================================================================

/// Body of `POST /functions/v1/threat-check`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreatCheckRequest {
    #[serde(default)]
    pub input: Option<String>,
    /// Overrides detection when the caller already classified the input
    #[serde(default)]
    pub input_type: Option<InputType>,
}

/// Body of `POST /api/v1/scam-check`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"input": "paypa1-secure-login.com"}))]
pub struct ScamCheckRequest {
    #[serde(default)]
    #[validate(length(max = 2048, message = "input must be at most 2048 characters"))]
    pub input: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentReportsQuery {
    /// Defaults to 5, at most 20
    pub limit: Option<i64>,
}

impl RecentReportsQuery {
    pub const DEFAULT_LIMIT: i64 = 5;
    pub const MAX_LIMIT: i64 = 20;

    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

/// External-provider aggregate for one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreatCheckResponse {
    pub input_type: InputType,
    pub url_candidate: Option<String>,
    #[serde(flatten)]
    pub aggregate: AggregateResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchecked_carries_no_evidence() {
        let result = SourceResult::unchecked("URLhaus", SourceType::External, "timeout");
        assert!(!result.checked);
        assert!(!result.flagged);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.reason.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_sanitized_repairs_remote_values() {
        let bogus = SourceResult {
            source: "remote".to_string(),
            source_type: SourceType::External,
            checked: false,
            flagged: true,
            confidence: 0.9,
            reason: None,
            details: None,
        };
        let fixed = bogus.sanitized();
        assert!(!fixed.flagged);
        assert_eq!(fixed.confidence, 0.0);

        let mut overconfident = SourceResult::checked("x", SourceType::External, true, 0.5);
        overconfident.confidence = 3.0;
        assert_eq!(overconfident.sanitized().confidence, 1.0);
    }

    #[test]
    fn test_verdict_at_least_never_lowers() {
        assert_eq!(Verdict::Danger.at_least(Verdict::Warning), Verdict::Danger);
        assert_eq!(Verdict::Clean.at_least(Verdict::Warning), Verdict::Warning);
        assert_eq!(Verdict::Unknown.at_least(Verdict::Warning), Verdict::Warning);
        assert_eq!(Verdict::Warning.at_least(Verdict::Clean), Verdict::Warning);
    }

    #[test]
    fn test_unknown_is_suspicious() {
        assert!(Verdict::Unknown.is_suspicious());
        assert!(Verdict::Warning.is_suspicious());
        assert!(Verdict::Danger.is_suspicious());
        assert!(!Verdict::Clean.is_suspicious());
    }

    #[test]
    fn test_source_result_serializes_camel_case() {
        let result = SourceResult::checked("Google Safe Browsing", SourceType::External, false, 0.67);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["sourceType"], "external");
        assert_eq!(json["checked"], true);
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn test_scam_check_request_length_limit() {
        let ok = ScamCheckRequest {
            input: "a".repeat(2048),
        };
        assert!(ok.validate().is_ok());

        let too_long = ScamCheckRequest {
            input: "a".repeat(2049),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_recent_reports_limit_is_clamped() {
        assert_eq!(RecentReportsQuery::default().effective_limit(), 5);
        assert_eq!(RecentReportsQuery { limit: Some(100) }.effective_limit(), 20);
        assert_eq!(RecentReportsQuery { limit: Some(0) }.effective_limit(), 1);
    }

    #[test]
    fn test_threat_check_response_flattens_aggregate() {
        let response = ThreatCheckResponse {
            input_type: InputType::Url,
            url_candidate: Some("https://example.com/".to_string()),
            aggregate: AggregateResult {
                verdict: Verdict::Clean,
                risk_score: 0,
                checked_count: 1,
                flagged_count: 0,
                external_checked_count: 1,
                external_source_count: 1,
                degraded: false,
                warnings: vec![],
                sources: vec![SourceResult::checked("VirusTotal", SourceType::External, false, 0.65)],
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["inputType"], "url");
        assert_eq!(json["verdict"], "clean");
        assert_eq!(json["riskScore"], 0);
        assert_eq!(json["sources"][0]["source"], "VirusTotal");

        let back: ThreatCheckResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back, response);
    }
}
