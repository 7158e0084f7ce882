// Curated block-list of known malicious URLs, domains, IPs and file hashes

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::check::TermKind;
use crate::schema::malicious_resources;

// =============================================================================
// ENUMS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Url,
    Domain,
    Ip,
    Hash,
    File,
    Other,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Url => "url",
            ResourceType::Domain => "domain",
            ResourceType::Ip => "ip",
            ResourceType::Hash => "hash",
            ResourceType::File => "file",
            ResourceType::Other => "other",
        }
    }

    /// Normalization scope for values of this type
    pub fn term_kind(&self) -> TermKind {
        match self {
            ResourceType::Url => TermKind::Url,
            ResourceType::Domain => TermKind::Domain,
            ResourceType::Ip => TermKind::Ip,
            ResourceType::Hash | ResourceType::File => TermKind::Hash,
            ResourceType::Other => TermKind::Other,
        }
    }

    /// Whether a lookup term of `kind` may match a stored resource of this type
    pub fn accepts(&self, kind: TermKind) -> bool {
        match (self, kind) {
            (ResourceType::Other, _) | (_, TermKind::Other) => true,
            (ResourceType::Url, TermKind::Url) => true,
            (ResourceType::Domain, TermKind::Domain) => true,
            (ResourceType::Ip, TermKind::Ip) => true,
            (ResourceType::Hash | ResourceType::File, TermKind::Hash) => true,
            _ => false,
        }
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "url" => Ok(ResourceType::Url),
            "domain" => Ok(ResourceType::Domain),
            "ip" => Ok(ResourceType::Ip),
            "hash" => Ok(ResourceType::Hash),
            "file" => Ok(ResourceType::File),
            "other" => Ok(ResourceType::Other),
            other => Err(format!("unknown resource type: {}", other)),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Curated risk level, shared by malicious resources and phishing domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn rank(&self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }

    /// Default level for an entry that only carries a confidence
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            RiskLevel::High
        } else if confidence >= 0.6 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Lenient parse of a stored value; unknown strings fall back to `from_confidence`
    pub fn parse_or(value: &str, confidence: f64) -> Self {
        value
            .parse()
            .unwrap_or_else(|_| RiskLevel::from_confidence(confidence))
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level: {}", other)),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Online,
    Offline,
    Unknown,
}

impl FromStr for ResourceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "online" => Ok(ResourceStatus::Online),
            "offline" => Ok(ResourceStatus::Offline),
            "unknown" => Ok(ResourceStatus::Unknown),
            other => Err(format!("unknown resource status: {}", other)),
        }
    }
}

// =============================================================================
// DATABASE MODEL
// =============================================================================

#[derive(Debug, Clone, Queryable, QueryableByName, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = malicious_resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MaliciousResourceRow {
    pub id: Uuid,
    pub resource_value: String,
    pub normalized_value: String,
    pub resource_type: String,
    pub threat_name: Option<String>,
    pub source: String,
    pub confidence: f64,
    pub risk_level: String,
    pub status: String,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Typed view of a malicious resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaliciousResource {
    pub id: Uuid,
    pub resource_value: String,
    pub normalized_value: String,
    pub resource_type: ResourceType,
    pub threat_name: Option<String>,
    pub source: String,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub status: ResourceStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl From<MaliciousResourceRow> for MaliciousResource {
    fn from(row: MaliciousResourceRow) -> Self {
        Self {
            id: row.id,
            resource_type: row.resource_type.parse().unwrap_or(ResourceType::Other),
            risk_level: RiskLevel::parse_or(&row.risk_level, row.confidence),
            status: row.status.parse().unwrap_or(ResourceStatus::Unknown),
            resource_value: row.resource_value,
            normalized_value: row.normalized_value,
            threat_name: row.threat_name,
            source: row.source,
            confidence: row.confidence,
            is_active: row.is_active,
            created_at: row.created_at,
            last_seen_at: row.last_seen_at,
        }
    }
}

impl MaliciousResourceRow {
    /// Active resources whose normalized value is one of `values`,
    /// ordered by risk level (high first) then recency
    pub async fn find_active_by_values(
        conn: &mut AsyncPgConnection,
        values: &[String],
        limit: i64,
    ) -> QueryResult<Vec<Self>> {
        use diesel::sql_query;
        use diesel::sql_types::{Array, BigInt, Text};

        if values.is_empty() {
            return Ok(Vec::new());
        }

        sql_query(
            "SELECT id, resource_value, normalized_value, resource_type, threat_name, source, \
             confidence, risk_level, status, is_active, notes, created_at, first_seen_at, \
             last_seen_at, updated_at \
             FROM malicious_resources \
             WHERE is_active AND normalized_value = ANY($1) \
             ORDER BY CASE risk_level WHEN 'high' THEN 3 WHEN 'medium' THEN 2 WHEN 'low' THEN 1 ELSE 0 END DESC, \
                      last_seen_at DESC, created_at DESC \
             LIMIT $2",
        )
        .bind::<Array<Text>, _>(values.to_vec())
        .bind::<BigInt, _>(limit)
        .load::<MaliciousResourceRow>(conn)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_from_confidence() {
        assert_eq!(RiskLevel::from_confidence(0.95), RiskLevel::High);
        assert_eq!(RiskLevel::from_confidence(0.9), RiskLevel::High);
        assert_eq!(RiskLevel::from_confidence(0.7), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_confidence(0.2), RiskLevel::Low);
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::High.rank() > RiskLevel::Medium.rank());
        assert!(RiskLevel::Medium.rank() > RiskLevel::Low.rank());
        assert_eq!(RiskLevel::parse_or("HIGH", 0.1), RiskLevel::High);
        assert_eq!(RiskLevel::parse_or("severe", 0.65), RiskLevel::Medium);
    }

    #[test]
    fn test_resource_type_accepts_term_kind() {
        assert!(ResourceType::Url.accepts(TermKind::Url));
        assert!(!ResourceType::Url.accepts(TermKind::Domain));
        assert!(ResourceType::File.accepts(TermKind::Hash));
        assert!(ResourceType::Other.accepts(TermKind::Ip));
        assert!(ResourceType::Domain.accepts(TermKind::Other));
        assert_eq!("Domain".parse::<ResourceType>(), Ok(ResourceType::Domain));
        assert!("bogus".parse::<ResourceType>().is_err());
    }
}
