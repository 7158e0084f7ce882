// Curated phishing domain list with trigram similarity search

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::malicious_resource::RiskLevel;
use crate::schema::trusted_phishing_domains;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = trusted_phishing_domains)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TrustedPhishingDomain {
    pub id: Uuid,
    pub domain: String,
    pub source: String,
    pub confidence: f64,
    pub risk_level: String,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrustedPhishingDomain {
    pub fn risk(&self) -> RiskLevel {
        RiskLevel::parse_or(&self.risk_level, self.confidence)
    }

    /// Exact lookup among active entries
    pub async fn find_active(
        conn: &mut AsyncPgConnection,
        domain_value: &str,
    ) -> QueryResult<Option<Self>> {
        use crate::schema::trusted_phishing_domains::dsl::*;

        trusted_phishing_domains
            .filter(domain.eq(domain_value))
            .filter(is_active.eq(true))
            .select(TrustedPhishingDomain::as_select())
            .first(conn)
            .await
            .optional()
    }

    /// Every active entry; used when the database cannot rank similarity itself
    pub async fn list_active(conn: &mut AsyncPgConnection) -> QueryResult<Vec<Self>> {
        use crate::schema::trusted_phishing_domains::dsl::*;

        trusted_phishing_domains
            .filter(is_active.eq(true))
            .order(domain.asc())
            .select(TrustedPhishingDomain::as_select())
            .load(conn)
            .await
    }

    /// pg_trgm ranked search, best match first
    pub async fn find_similar(
        conn: &mut AsyncPgConnection,
        input_domain: &str,
        threshold: f64,
        max_results: i64,
    ) -> QueryResult<Vec<SimilarDomainRow>> {
        use diesel::sql_query;
        use diesel::sql_types::{BigInt, Double, Text};

        sql_query(
            "SELECT domain, similarity(domain, $1)::float8 AS similarity, source, confidence, risk_level \
             FROM trusted_phishing_domains \
             WHERE is_active AND similarity(domain, $1) >= $2 \
             ORDER BY similarity DESC, domain ASC \
             LIMIT $3",
        )
        .bind::<Text, _>(input_domain)
        .bind::<Double, _>(threshold)
        .bind::<BigInt, _>(max_results)
        .load::<SimilarDomainRow>(conn)
        .await
    }
}

#[derive(Debug, Clone, QueryableByName)]
pub struct SimilarDomainRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub domain: String,
    #[diesel(sql_type = diesel::sql_types::Double)]
    pub similarity: f64,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub source: String,
    #[diesel(sql_type = diesel::sql_types::Double)]
    pub confidence: f64,
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub risk_level: String,
}

/// Phishing domain candidate returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhishingDomainMatch {
    pub domain: String,
    pub similarity: f64,
    pub source: String,
    pub confidence: f64,
    pub risk_level: RiskLevel,
}

impl From<SimilarDomainRow> for PhishingDomainMatch {
    fn from(row: SimilarDomainRow) -> Self {
        Self {
            risk_level: RiskLevel::parse_or(&row.risk_level, row.confidence),
            domain: row.domain,
            similarity: row.similarity,
            source: row.source,
            confidence: row.confidence,
        }
    }
}

impl PhishingDomainMatch {
    /// An exact hit scores similarity 1.0
    pub fn exact(entry: &TrustedPhishingDomain) -> Self {
        Self {
            domain: entry.domain.clone(),
            similarity: 1.0,
            source: entry.source.clone(),
            confidence: entry.confidence,
            risk_level: entry.risk(),
        }
    }

    pub fn with_similarity(entry: &TrustedPhishingDomain, similarity: f64) -> Self {
        Self {
            similarity,
            ..Self::exact(entry)
        }
    }
}
