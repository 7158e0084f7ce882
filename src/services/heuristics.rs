// Heuristic URL risk analysis
// Local, network-free scoring of URL structure

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use url::Host;

use crate::models::check::{InputType, SourceResult, SourceType};
use crate::services::normalizer::parse_http_url;

pub const HEURISTIC_SOURCE: &str = "Heuristic URL analysis";

const WEIGHT_IP_HOST: f64 = 0.65;
const WEIGHT_PLAIN_HTTP: f64 = 0.20;
const WEIGHT_ODD_PORT: f64 = 0.30;
const WEIGHT_DEEP_NESTING: f64 = 0.10;
const WEIGHT_KEYWORD: f64 = 0.10;
const WEIGHT_FREE_HOST: f64 = 0.12;
const WEIGHT_RANDOM_SUFFIX: f64 = 0.22;
const WEIGHT_HYPHENS: f64 = 0.08;

const MAX_CONFIDENCE: f64 = 0.95;
const FLAG_THRESHOLD: f64 = 0.45;
const NO_SIGNAL_CONFIDENCE: f64 = 0.55;

const PHISHING_KEYWORDS: &[&str] = &[
    "login", "verify", "secure", "update", "wallet", "bank", "signin", "account", "invoice",
    "urgent", "coupon", "gift", "bonus", "promo", "prize",
];

const FREE_HOSTING_SUFFIXES: &[&str] = &[
    "pages.dev",
    "github.io",
    "netlify.app",
    "vercel.app",
    "web.app",
    "firebaseapp.com",
];

lazy_static! {
    static ref RANDOM_SUFFIX: Regex = Regex::new(r"(?i)(?:-[a-f0-9]{6,}|-\d{5,})$").unwrap();
}

/// Outcome of the analyzer for one URL
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicAssessment {
    pub result: SourceResult,
    pub reasons: Vec<String>,
    /// Bare IPv4 host over plain http on a non-standard port
    pub critical: bool,
}

/// Score the structure of a URL input. `None` for other input types or
/// values that do not parse as a URL.
pub fn assess(raw: &str, input_type: InputType) -> Option<HeuristicAssessment> {
    if input_type != InputType::Url {
        return None;
    }
    let url = parse_http_url(raw)?;
    let host = url.host_str()?.to_lowercase();

    let mut reasons = Vec::new();
    let mut score: f64 = 0.0;

    let is_ip = matches!(url.host(), Some(Host::Ipv4(_)));
    if is_ip {
        score += WEIGHT_IP_HOST;
        reasons.push("direct IP host used instead of domain".to_string());
    }

    let plain_http = url.scheme() == "http";
    if plain_http {
        score += WEIGHT_PLAIN_HTTP;
        reasons.push("URL uses plain HTTP without TLS".to_string());
    }

    // `port()` is None when the port is the scheme default
    let odd_port = url.port().filter(|port| *port != 80 && *port != 443);
    if let Some(port) = odd_port {
        score += WEIGHT_ODD_PORT;
        reasons.push(format!("URL uses a non-standard port ({})", port));
    }

    let path = url.path().to_lowercase();
    if let Some(keyword) = PHISHING_KEYWORDS
        .iter()
        .find(|keyword| host.contains(*keyword) || path.contains(*keyword))
    {
        score += WEIGHT_KEYWORD;
        reasons.push(format!("URL contains phishing keyword \"{}\"", keyword));
    }

    if !is_ip {
        let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();

        if labels.len() >= 4 {
            score += WEIGHT_DEEP_NESTING;
            reasons.push("deeply nested subdomains".to_string());
        }

        if FREE_HOSTING_SUFFIXES
            .iter()
            .any(|suffix| host == *suffix || host.ends_with(&format!(".{}", suffix)))
        {
            score += WEIGHT_FREE_HOST;
            reasons.push("URL is hosted on a free subdomain platform".to_string());
        }

        let first_label = labels.first().copied().unwrap_or_default();
        if RANDOM_SUFFIX.is_match(first_label) {
            score += WEIGHT_RANDOM_SUFFIX;
            reasons.push("subdomain contains random-looking suffix".to_string());
        }

        if first_label.matches('-').count() >= 3 {
            score += WEIGHT_HYPHENS;
            reasons.push("high hyphen density in subdomain".to_string());
        }
    }

    let critical = is_ip && plain_http && odd_port.is_some();

    let result = (if reasons.is_empty() {
        SourceResult::checked(HEURISTIC_SOURCE, SourceType::Heuristic, false, NO_SIGNAL_CONFIDENCE)
            .with_reason("no high-risk heuristic signals")
    } else {
        let confidence = score.min(MAX_CONFIDENCE);
        SourceResult::checked(
            HEURISTIC_SOURCE,
            SourceType::Heuristic,
            confidence >= FLAG_THRESHOLD,
            confidence,
        )
        .with_reason(reasons.join("; "))
    })
    .with_details(json!({ "reasons": reasons, "critical": critical }));

    Some(HeuristicAssessment {
        result,
        reasons,
        critical,
    })
}

/// Analyzer output as a source list (empty unless the input is a parseable URL)
pub fn analyze(raw: &str, input_type: InputType) -> Vec<SourceResult> {
    assess(raw, input_type)
        .map(|assessment| vec![assessment.result])
        .unwrap_or_default()
}
