// Read-only data access for the internal signal sources
// Traits are the injection seam; PgSignalStore is the production implementation

use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::DieselPool;
use crate::models::check::NormalizedTerm;
use crate::models::malicious_resource::{MaliciousResource, MaliciousResourceRow};
use crate::models::report::{ReportSummary, ScamReport};
use crate::models::trusted_domain::{PhishingDomainMatch, TrustedPhishingDomain};
use crate::services::similarity::rank_by_similarity;

/// Rows fetched before the (type, value) pairing is applied in process
const RESOURCE_FETCH_WINDOW: i64 = 50;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Approved reports containing any of `terms`, most recent first
    async fn search_approved(
        &self,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<ReportSummary>, StoreError>;

    async fn recent_approved(&self, limit: usize) -> Result<Vec<ReportSummary>, StoreError>;
}

#[async_trait]
pub trait MaliciousResourceStore: Send + Sync {
    /// Active resources matching one of the candidate terms, highest risk first
    async fn find_active(
        &self,
        candidates: &[NormalizedTerm],
        limit: usize,
    ) -> Result<Vec<MaliciousResource>, StoreError>;
}

#[async_trait]
pub trait PhishingDomainStore: Send + Sync {
    async fn find_exact(&self, domain: &str) -> Result<Option<PhishingDomainMatch>, StoreError>;

    /// Active domains with similarity >= `threshold`, best first
    async fn find_similar(
        &self,
        domain: &str,
        threshold: f64,
        max_results: usize,
    ) -> Result<Vec<PhishingDomainMatch>, StoreError>;
}

/// Keep only resources whose (type, value) pair matches a candidate
pub fn retain_matching(
    resources: Vec<MaliciousResource>,
    candidates: &[NormalizedTerm],
    limit: usize,
) -> Vec<MaliciousResource> {
    let mut matching: Vec<MaliciousResource> = resources
        .into_iter()
        .filter(|resource| {
            candidates.iter().any(|candidate| {
                candidate.value == resource.normalized_value
                    && resource.resource_type.accepts(candidate.kind)
            })
        })
        .collect();
    matching.sort_by(|a, b| {
        b.risk_level
            .rank()
            .cmp(&a.risk_level.rank())
            .then_with(|| b.last_seen_at.cmp(&a.last_seen_at))
    });
    matching.truncate(limit);
    matching
}

// =============================================================================
// POSTGRES IMPLEMENTATION
// =============================================================================

#[derive(Clone)]
pub struct PgSignalStore {
    pool: DieselPool,
}

impl PgSignalStore {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    async fn similar_in_process(
        &self,
        domain: &str,
        threshold: f64,
        max_results: usize,
    ) -> Result<Vec<PhishingDomainMatch>, StoreError> {
        let mut conn = self.pool.get().await.map_err(|e| StoreError::Pool(e.to_string()))?;
        let entries = TrustedPhishingDomain::list_active(&mut conn).await?;

        let ranked = rank_by_similarity(
            domain,
            entries.iter().map(|entry| entry.domain.as_str()),
            threshold,
            max_results,
        );

        Ok(ranked
            .into_iter()
            .filter_map(|(name, score)| {
                entries
                    .iter()
                    .find(|entry| entry.domain == name)
                    .map(|entry| PhishingDomainMatch::with_similarity(entry, score))
            })
            .collect())
    }
}

#[async_trait]
impl ReportStore for PgSignalStore {
    async fn search_approved(
        &self,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<ReportSummary>, StoreError> {
        let mut conn = self.pool.get().await.map_err(|e| StoreError::Pool(e.to_string()))?;
        let reports = ScamReport::search_approved(&mut conn, terms, limit as i64).await?;
        Ok(reports.into_iter().map(ReportSummary::from).collect())
    }

    async fn recent_approved(&self, limit: usize) -> Result<Vec<ReportSummary>, StoreError> {
        let mut conn = self.pool.get().await.map_err(|e| StoreError::Pool(e.to_string()))?;
        let reports = ScamReport::recent_approved(&mut conn, limit as i64).await?;
        Ok(reports.into_iter().map(ReportSummary::from).collect())
    }
}

#[async_trait]
impl MaliciousResourceStore for PgSignalStore {
    async fn find_active(
        &self,
        candidates: &[NormalizedTerm],
        limit: usize,
    ) -> Result<Vec<MaliciousResource>, StoreError> {
        let mut seen = HashSet::new();
        let values: Vec<String> = candidates
            .iter()
            .map(|candidate| candidate.value.clone())
            .filter(|value| seen.insert(value.clone()))
            .collect();

        let mut conn = self.pool.get().await.map_err(|e| StoreError::Pool(e.to_string()))?;
        let rows =
            MaliciousResourceRow::find_active_by_values(&mut conn, &values, RESOURCE_FETCH_WINDOW)
                .await?;

        let resources = rows.into_iter().map(MaliciousResource::from).collect();
        Ok(retain_matching(resources, candidates, limit))
    }
}

#[async_trait]
impl PhishingDomainStore for PgSignalStore {
    async fn find_exact(&self, domain: &str) -> Result<Option<PhishingDomainMatch>, StoreError> {
        let mut conn = self.pool.get().await.map_err(|e| StoreError::Pool(e.to_string()))?;
        let entry = TrustedPhishingDomain::find_active(&mut conn, domain).await?;
        Ok(entry.as_ref().map(PhishingDomainMatch::exact))
    }

    async fn find_similar(
        &self,
        domain: &str,
        threshold: f64,
        max_results: usize,
    ) -> Result<Vec<PhishingDomainMatch>, StoreError> {
        let sql_result = {
            let mut conn = self.pool.get().await.map_err(|e| StoreError::Pool(e.to_string()))?;
            TrustedPhishingDomain::find_similar(&mut conn, domain, threshold, max_results as i64)
                .await
        };

        match sql_result {
            Ok(rows) => Ok(rows.into_iter().map(PhishingDomainMatch::from).collect()),
            Err(e) => {
                // pg_trgm missing or similarity() rejected; rank here instead
                warn!("similarity() query failed, ranking in process: {}", e);
                let matches = self.similar_in_process(domain, threshold, max_results).await?;
                debug!("in-process similarity produced {} candidates", matches.len());
                Ok(matches)
            },
        }
    }
}
