// Canonical lookup keys for URLs, domains, IPs and hashes
//
// These keys back the (resource_type, normalized_value) uniqueness constraint
// of the curated block-list, so every function here is total and idempotent.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use url::{Host, Url};

use crate::models::check::{CheckInput, InputType, NormalizedTerm, TermKind};
use crate::services::classifier::{digits_only, email_domain};

lazy_static! {
    static ref ANY_SCHEME: Regex = Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://").unwrap();
    static ref HTTP_SCHEME: Regex = Regex::new(r"(?i)^https?://").unwrap();
    static ref TRAILING_PORT: Regex = Regex::new(r"(?::\d+)+$").unwrap();
    static ref HEX_DIGEST: Regex = Regex::new(r"^[a-f0-9]{32,128}$").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

pub const MAX_REPORT_TERMS: usize = 4;
pub const MAX_RESOURCE_TERMS: usize = 12;

/// Normalize `value` for comparisons of the given kind
pub fn normalize(value: &str, kind: TermKind) -> NormalizedTerm {
    let normalized = match kind {
        TermKind::Url => normalize_url(value),
        TermKind::Domain => normalize_domain(value),
        TermKind::Ip => normalize_ip(value),
        TermKind::Hash => normalize_hash(value),
        TermKind::Other => value.trim().to_lowercase(),
    };
    NormalizedTerm::new(normalized, kind)
}

/// `https://` is assumed when no scheme is given. Query, fragment and trailing
/// slashes are dropped. Unparseable values come back lower-cased as they are.
pub fn normalize_url(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let candidate = if ANY_SCHEME.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    match Url::parse(&candidate) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            let serialized = url.as_str().to_lowercase();
            // trimming `file:///` down to `file:` would lose the scheme marker
            match url.host_str() {
                Some(host) if !host.is_empty() => serialized.trim_end_matches('/').to_string(),
                _ => serialized,
            }
        },
        Err(_) => trimmed.to_lowercase(),
    }
}

pub fn normalize_domain(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let without_scheme = ANY_SCHEME.replace(&lowered, "");
    let mut host = cut_at_path(&without_scheme);
    while let Some(rest) = host.strip_prefix("www.") {
        host = rest;
    }
    host.to_string()
}

pub fn normalize_ip(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let without_scheme = ANY_SCHEME.replace(&lowered, "");
    let host = cut_at_path(&without_scheme);
    TRAILING_PORT.replace(host, "").to_string()
}

pub fn normalize_hash(value: &str) -> String {
    WHITESPACE.replace_all(value, "").to_lowercase()
}

fn cut_at_path(value: &str) -> &str {
    match value.find(&['/', '?', '#'][..]) {
        Some(idx) => &value[..idx],
        None => value,
    }
}

// =============================================================================
// URL CANDIDATE
// =============================================================================

/// The single URL the external feeds are asked about.
///
/// URL inputs are used as given (with `https://` assumed); email inputs become
/// `https://<domain>/`; phone and unknown inputs have no candidate.
pub fn url_candidate(input: &CheckInput) -> Option<String> {
    match input.input_type {
        InputType::Url => parse_http_url(&input.raw).map(|url| url.to_string()),
        InputType::Email => {
            let domain = email_domain(&input.raw)?;
            parse_http_url(&domain).map(|url| url.to_string())
        },
        InputType::Phone | InputType::Unknown => None,
    }
}

/// Parse with `https://` assumed when there is no http(s) scheme
pub fn parse_http_url(value: &str) -> Option<Url> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if HTTP_SCHEME.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let url = Url::parse(&candidate).ok()?;
    url.host_str()?;
    Some(url)
}

/// Host of a URL-like value, lower-cased and without a leading `www.`
pub fn host_of(value: &str) -> Option<String> {
    let url = parse_http_url(value)?;
    let host = url.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Domain the phishing list is matched against: the URL host or the email domain
pub fn lookup_domain(input: &CheckInput) -> Option<String> {
    let domain = match input.input_type {
        InputType::Url => host_of(&input.raw)?,
        InputType::Email => normalize_domain(&email_domain(&input.raw)?),
        InputType::Phone | InputType::Unknown => return None,
    };
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

// =============================================================================
// SEARCH TERMS
// =============================================================================

/// Substring terms for the community report search (at most four)
pub fn report_search_terms(input: &CheckInput) -> Vec<String> {
    let mut terms = vec![input.raw.clone()];

    match input.input_type {
        InputType::Url => {
            if let Some(url) = parse_http_url(&input.raw) {
                if let Some(host) = url.host_str() {
                    terms.push(host.to_string());
                }
            }
        },
        InputType::Email => {
            if let Some(domain) = email_domain(&input.raw) {
                terms.push(domain);
            }
        },
        InputType::Phone => terms.push(digits_only(&input.raw)),
        InputType::Unknown => {},
    }

    let mut seen = HashSet::new();
    terms
        .into_iter()
        .map(|term| {
            term.chars()
                .map(|c| if matches!(c, '%' | '(' | ')' | ',') { ' ' } else { c })
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|term| !term.is_empty())
        .filter(|term| seen.insert(term.to_lowercase()))
        .take(MAX_REPORT_TERMS)
        .collect()
}

/// Every plausible normalized reading of the input for the malicious-resource
/// lookup (at most twelve, deduplicated, in priority order)
pub fn resource_candidates(input: &CheckInput) -> Vec<NormalizedTerm> {
    let raw = input.raw.trim();
    let mut candidates: Vec<NormalizedTerm> = Vec::new();
    let mut push = |term: NormalizedTerm| {
        if !term.value.is_empty() && !candidates.contains(&term) {
            candidates.push(term);
        }
    };

    push(NormalizedTerm::new(raw.to_lowercase(), TermKind::Other));

    if input.input_type == InputType::Email {
        if let Some(domain) = email_domain(raw) {
            push(normalize(&domain, TermKind::Domain));
            push(normalize(&domain, TermKind::Url));
        }
    }

    let hash = normalize_hash(raw);
    if HEX_DIGEST.is_match(&hash) {
        push(NormalizedTerm::new(hash, TermKind::Hash));
    }

    if input.input_type == InputType::Url {
        push(normalize(raw, TermKind::Url));

        if let Some(url) = parse_http_url(raw) {
            // Same resource under the other web scheme
            let mut alternate = url.clone();
            let other_scheme = if url.scheme() == "https" { "http" } else { "https" };
            if alternate.set_scheme(other_scheme).is_ok() {
                push(normalize(alternate.as_str(), TermKind::Url));
            }

            match url.host() {
                Some(Host::Ipv4(ip)) => push(NormalizedTerm::new(ip.to_string(), TermKind::Ip)),
                Some(Host::Ipv6(ip)) => push(NormalizedTerm::new(ip.to_string(), TermKind::Ip)),
                Some(Host::Domain(domain)) => push(normalize(domain, TermKind::Domain)),
                None => {},
            }

            let path = url.path().trim_end_matches('/');
            if !path.is_empty() {
                if let Some(host) = url.host_str() {
                    push(NormalizedTerm::new(
                        format!("{}{}", host, path).to_lowercase(),
                        TermKind::Other,
                    ));
                }
                push(NormalizedTerm::new(
                    format!("{}{}", url.origin().ascii_serialization(), path).to_lowercase(),
                    TermKind::Url,
                ));
            }
        }
    }

    candidates.truncate(MAX_RESOURCE_TERMS);
    candidates
}
