// Verdict engine
//
// Combines heterogeneous source results into one risk score and verdict.
// Internal list matches are policy overrides layered on top of the base
// aggregate; they can only raise severity.

use std::collections::HashSet;
use tracing::debug;

use crate::models::check::{AggregateResult, SourceResult, SourceType, Verdict};
use crate::models::malicious_resource::RiskLevel;

pub const WARNING_NO_CONFIRMED_RESULT: &str =
    "No source returned a confirmed result; the check is incomplete.";
pub const WARNING_EXTERNAL_UNAVAILABLE: &str = "External checks are temporarily unavailable.";
pub const WARNING_HEURISTICS_ONLY: &str =
    "This verdict rests only on local heuristics; no external source confirmed it.";

const DANGER_SCORE: u8 = 75;
const FLAGGED_DANGER_SCORE: u8 = 60;
/// Ceiling for a score backed by nothing but the local heuristic
const HEURISTIC_ONLY_SCORE_CAP: u8 = 40;

/// Aggregate `sources` into a verdict.
///
/// Unchecked sources carry no evidence; they only count toward
/// `externalSourceCount` and the coverage warnings.
pub fn aggregate(sources: &[SourceResult]) -> AggregateResult {
    let sources: Vec<SourceResult> = sources.iter().cloned().map(SourceResult::sanitized).collect();

    let checked: Vec<&SourceResult> = sources.iter().filter(|s| s.checked).collect();
    let flagged: Vec<&SourceResult> = checked.iter().copied().filter(|s| s.flagged).collect();

    let external_source_count = sources
        .iter()
        .filter(|s| s.source_type == SourceType::External)
        .count();
    let external_checked_count = checked
        .iter()
        .filter(|s| s.source_type == SourceType::External)
        .count();
    let external_flagged: HashSet<&str> = flagged
        .iter()
        .filter(|s| s.source_type == SourceType::External)
        .map(|s| s.source.as_str())
        .collect();

    let total_confidence: f64 = checked.iter().map(|s| s.confidence).sum();
    let flagged_confidence: f64 = flagged.iter().map(|s| s.confidence).sum();
    let mut risk_score = if total_confidence > 0.0 {
        (100.0 * flagged_confidence / total_confidence).round().clamp(0.0, 100.0) as u8
    } else {
        0
    };

    // Without an external answer the heuristic is the whole denominator,
    // so its raw score would always be 100.
    let heuristic_only = external_checked_count == 0
        && !flagged.is_empty()
        && flagged.iter().all(|s| s.source_type == SourceType::Heuristic);

    let mut warnings = Vec::new();
    let verdict = if heuristic_only {
        risk_score = risk_score.min(HEURISTIC_ONLY_SCORE_CAP);
        warnings.push(WARNING_HEURISTICS_ONLY.to_string());
        Verdict::Warning
    } else if external_flagged.len() >= 2 || risk_score >= DANGER_SCORE {
        Verdict::Danger
    } else if !flagged.is_empty() {
        if risk_score >= FLAGGED_DANGER_SCORE {
            Verdict::Danger
        } else {
            Verdict::Warning
        }
    } else if external_checked_count > 0 {
        Verdict::Clean
    } else {
        warnings.push(WARNING_NO_CONFIRMED_RESULT.to_string());
        Verdict::Unknown
    };

    let degraded = external_checked_count == 0;
    if degraded {
        warnings.push(WARNING_EXTERNAL_UNAVAILABLE.to_string());
    } else if external_checked_count < external_source_count {
        warnings.push(format!(
            "{} of {} external sources did not answer.",
            external_source_count - external_checked_count,
            external_source_count
        ));
    }

    AggregateResult {
        verdict,
        risk_score,
        checked_count: checked.len(),
        flagged_count: flagged.len(),
        external_checked_count,
        external_source_count,
        degraded,
        warnings,
        sources,
    }
}

/// Raise the verdict to at least `floor` and the score to at least `min_score`
pub fn raise(aggregate: AggregateResult, floor: Verdict, min_score: u8) -> AggregateResult {
    AggregateResult {
        verdict: aggregate.verdict.at_least(floor),
        risk_score: aggregate.risk_score.max(min_score.min(100)),
        ..aggregate
    }
}

/// Mark an aggregate as degraded and make sure the coverage warning is present
pub fn degrade(aggregate: AggregateResult) -> AggregateResult {
    let mut warnings = aggregate.warnings;
    if !warnings.iter().any(|w| w == WARNING_EXTERNAL_UNAVAILABLE) {
        warnings.push(WARNING_EXTERNAL_UNAVAILABLE.to_string());
    }
    AggregateResult {
        degraded: true,
        warnings,
        ..aggregate
    }
}

// =============================================================================
// INTERNAL OVERRIDES
// =============================================================================

/// What the internal sources found, reduced to what the override policy needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InternalSignals {
    pub heuristic_critical: bool,
    pub report_matched: bool,
    pub malicious_risk: Option<RiskLevel>,
    /// `Some(high_risk)` when the phishing list matched
    pub phishing_match: Option<bool>,
}

/// Apply the internal-source policy on top of a base aggregate
pub fn apply_overrides(aggregate: AggregateResult, signals: &InternalSignals) -> AggregateResult {
    let mut result = aggregate;

    if signals.heuristic_critical {
        debug!("override: critical heuristic combination");
        result = raise(result, Verdict::Danger, 100);
    }

    if signals.report_matched {
        debug!("override: community report match");
        result = raise(result, Verdict::Warning, 35);
    }

    match signals.malicious_risk {
        Some(RiskLevel::High) => {
            debug!("override: high-risk malicious resource");
            result = raise(result, Verdict::Danger, 85);
        },
        Some(_) => {
            debug!("override: malicious resource below high risk");
            result = raise(result, Verdict::Warning, 45);
        },
        None => {},
    }

    match signals.phishing_match {
        Some(true) => {
            debug!("override: high-risk phishing domain");
            result = raise(result, Verdict::Danger, 85);
        },
        Some(false) => {
            debug!("override: phishing domain");
            result = raise(result, Verdict::Warning, 50);
        },
        None => {},
    }

    result
}
