// Common test utilities and helper structs
// In-memory stores and stub providers so the pipeline runs without PostgreSQL or the network

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use staysafe_scamcheck::{
    app::AppState,
    build_router,
    models::{
        check::{CheckInput, NormalizedTerm, SourceResult, SourceType, ThreatCheckResponse},
        malicious_resource::{MaliciousResource, ResourceStatus, ResourceType, RiskLevel},
        report::ReportSummary,
        trusted_domain::PhishingDomainMatch,
    },
    services::{
        signals::{
            store::retain_matching, MaliciousResourceMatcher, MaliciousResourceStore,
            PhishingDomainMatcher, PhishingDomainStore, ReportMatcher, ReportStore, StoreError,
        },
        similarity::rank_by_similarity,
        aggregate, InProcessThreatCheck, PipelineError, ProviderError, RecentChecks, ScamCheckService,
        ThreatCheckRpc, ThreatFeedAggregator, ThreatProvider,
    },
    CorsPolicy,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const SIMILARITY_THRESHOLD: f64 = 0.52;
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(6);

// =============================================================================
// IN-MEMORY STORES
// =============================================================================

/// Every signal table in memory
#[derive(Default)]
pub struct MemoryStore {
    pub reports: Vec<ReportSummary>,
    pub resources: Vec<MaliciousResource>,
    pub phishing_domains: Vec<PhishingDomainMatch>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn with_report(mut self, title: &str, url: Option<&str>, phone: Option<&str>) -> Self {
        self.reports.push(report(title, url, phone, self.reports.len() as i64));
        self
    }

    pub fn with_resource(mut self, value: &str, resource_type: ResourceType, risk: RiskLevel) -> Self {
        self.resources.push(resource(value, resource_type, risk));
        self
    }

    pub fn with_phishing_domain(mut self, domain: &str, risk: RiskLevel, confidence: f64) -> Self {
        self.phishing_domains.push(PhishingDomainMatch {
            domain: domain.to_string(),
            similarity: 1.0,
            source: "trusted-list".to_string(),
            confidence,
            risk_level: risk,
        });
        self
    }

    /// Every lookup fails, as with a lost database
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.fail {
            Err(StoreError::Pool("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn search_approved(
        &self,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<ReportSummary>, StoreError> {
        self.check_available()?;
        let contains = |field: Option<&str>, term: &str| {
            field
                .map(|f| f.to_lowercase().contains(&term.to_lowercase()))
                .unwrap_or(false)
        };
        let mut matches: Vec<ReportSummary> = self
            .reports
            .iter()
            .filter(|r| {
                terms.iter().any(|term| {
                    contains(Some(&r.title), term)
                        || contains(r.url.as_deref(), term)
                        || contains(r.phone.as_deref(), term)
                })
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn recent_approved(&self, limit: usize) -> Result<Vec<ReportSummary>, StoreError> {
        self.check_available()?;
        let mut reports = self.reports.clone();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reports.truncate(limit);
        Ok(reports)
    }
}

#[async_trait]
impl MaliciousResourceStore for MemoryStore {
    async fn find_active(
        &self,
        candidates: &[NormalizedTerm],
        limit: usize,
    ) -> Result<Vec<MaliciousResource>, StoreError> {
        self.check_available()?;
        let active = self.resources.iter().filter(|r| r.is_active).cloned().collect();
        Ok(retain_matching(active, candidates, limit))
    }
}

#[async_trait]
impl PhishingDomainStore for MemoryStore {
    async fn find_exact(&self, domain: &str) -> Result<Option<PhishingDomainMatch>, StoreError> {
        self.check_available()?;
        Ok(self.phishing_domains.iter().find(|d| d.domain == domain).cloned())
    }

    async fn find_similar(
        &self,
        domain: &str,
        threshold: f64,
        max_results: usize,
    ) -> Result<Vec<PhishingDomainMatch>, StoreError> {
        self.check_available()?;
        let ranked = rank_by_similarity(
            domain,
            self.phishing_domains.iter().map(|d| d.domain.as_str()),
            threshold,
            max_results,
        );
        Ok(ranked
            .into_iter()
            .filter_map(|(name, score)| {
                self.phishing_domains
                    .iter()
                    .find(|d| d.domain == name)
                    .map(|d| PhishingDomainMatch {
                        similarity: score,
                        ..d.clone()
                    })
            })
            .collect())
    }
}

pub fn report(title: &str, url: Option<&str>, phone: Option<&str>, age_days: i64) -> ReportSummary {
    ReportSummary {
        id: Uuid::new_v4(),
        title: title.to_string(),
        category: "phishing".to_string(),
        scam_type: None,
        created_at: Utc::now() - ChronoDuration::days(age_days),
        status: "approved".to_string(),
        url: url.map(String::from),
        phone: phone.map(String::from),
    }
}

pub fn resource(value: &str, resource_type: ResourceType, risk: RiskLevel) -> MaliciousResource {
    let now = Utc::now();
    MaliciousResource {
        id: Uuid::new_v4(),
        resource_value: value.to_string(),
        normalized_value: value.to_string(),
        resource_type,
        threat_name: Some("credential phishing".to_string()),
        source: "manual".to_string(),
        confidence: 0.9,
        risk_level: risk,
        status: ResourceStatus::Online,
        is_active: true,
        created_at: now,
        last_seen_at: now,
    }
}

// =============================================================================
// STUB PROVIDERS
// =============================================================================

/// Provider with a canned answer
pub struct StaticProvider {
    pub name: &'static str,
    pub flagged: bool,
    pub confidence: f64,
}

#[async_trait]
impl ThreatProvider for StaticProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn lookup(&self, _url_candidate: &str) -> Result<SourceResult, ProviderError> {
        Ok(
            SourceResult::checked(self.name, SourceType::External, self.flagged, self.confidence)
                .with_reason(if self.flagged { "listed" } else { "not listed" }),
        )
    }
}

/// Provider that never answers inside the timeout
pub struct HangingProvider {
    pub name: &'static str,
}

#[async_trait]
impl ThreatProvider for HangingProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn lookup(&self, _url_candidate: &str) -> Result<SourceResult, ProviderError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(ProviderError::Status(504))
    }
}

pub fn clean_providers() -> Vec<Arc<dyn ThreatProvider>> {
    vec![
        Arc::new(StaticProvider {
            name: "phish.sinking.yachts",
            flagged: false,
            confidence: 0.6,
        }),
        Arc::new(StaticProvider {
            name: "URLhaus",
            flagged: false,
            confidence: 0.58,
        }),
        Arc::new(StaticProvider {
            name: "Google Safe Browsing",
            flagged: false,
            confidence: 0.67,
        }),
    ]
}

pub fn hanging_providers() -> Vec<Arc<dyn ThreatProvider>> {
    vec![
        Arc::new(HangingProvider {
            name: "phish.sinking.yachts",
        }),
        Arc::new(HangingProvider { name: "URLhaus" }),
        Arc::new(HangingProvider {
            name: "Google Safe Browsing",
        }),
    ]
}

/// Threat-check RPC answering with a fixed list of sources
pub struct FixedRpc(pub Vec<SourceResult>);

#[async_trait]
impl ThreatCheckRpc for FixedRpc {
    async fn threat_check(&self, input: &CheckInput) -> Result<ThreatCheckResponse, PipelineError> {
        Ok(ThreatCheckResponse {
            input_type: input.input_type,
            url_candidate: Some(input.raw.clone()),
            aggregate: aggregate(&self.0),
        })
    }
}

/// Threat-check RPC that is always down
pub struct UnreachableRpc;

#[async_trait]
impl ThreatCheckRpc for UnreachableRpc {
    async fn threat_check(&self, _input: &CheckInput) -> Result<ThreatCheckResponse, PipelineError> {
        Err(PipelineError::Status(503))
    }
}

// =============================================================================
// SERVICE BUILDERS
// =============================================================================

pub fn aggregator(providers: Vec<Arc<dyn ThreatProvider>>) -> Arc<ThreatFeedAggregator> {
    Arc::new(ThreatFeedAggregator::new(providers, PROVIDER_TIMEOUT))
}

pub fn service_with_rpc(store: MemoryStore, rpc: Arc<dyn ThreatCheckRpc>) -> ScamCheckService {
    let store = Arc::new(store);
    ScamCheckService::new(
        ReportMatcher::new(store.clone()),
        MaliciousResourceMatcher::new(store.clone()),
        PhishingDomainMatcher::new(store, SIMILARITY_THRESHOLD, 5),
        rpc,
    )
}

pub fn service(store: MemoryStore, providers: Vec<Arc<dyn ThreatProvider>>) -> ScamCheckService {
    service_with_rpc(store, Arc::new(InProcessThreatCheck::new(aggregator(providers))))
}

// =============================================================================
// HTTP HARNESS
// =============================================================================

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new(store: MemoryStore, providers: Vec<Arc<dyn ThreatProvider>>) -> Self {
        Self::with_cors(store, providers, CorsPolicy::permissive())
    }

    pub fn with_cors(
        store: MemoryStore,
        providers: Vec<Arc<dyn ThreatProvider>>,
        cors: CorsPolicy,
    ) -> Self {
        let store = Arc::new(store);
        let threat_feeds = aggregator(providers);
        let scam_check = ScamCheckService::new(
            ReportMatcher::new(store.clone()),
            MaliciousResourceMatcher::new(store.clone()),
            PhishingDomainMatcher::new(store.clone(), SIMILARITY_THRESHOLD, 5),
            Arc::new(InProcessThreatCheck::new(threat_feeds.clone())),
        );

        let state = AppState {
            diesel_pool: None,
            scam_check: Arc::new(scam_check),
            threat_feeds,
            reports: store,
            recent_checks: Arc::new(RwLock::new(RecentChecks::new(5))),
            max_connections: 0,
        };

        Self {
            router: build_router(state.clone(), cors, true),
            state,
        }
    }

    /// Send one request and return status, headers and the body as JSON (Null when empty or not JSON)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<&str>,
        origin: Option<&str>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        if let Some(origin) = origin {
            builder = builder.header(header::ORIGIN, origin);
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, headers, json)
    }

    pub async fn post_json(&self, uri: &str, body: &str) -> (StatusCode, HeaderMap, Value) {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, Value) {
        self.request(Method::GET, uri, None, None).await
    }
}
