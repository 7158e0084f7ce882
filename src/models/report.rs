// Community scam reports (read-only from the scam check's point of view)

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::schema::scam_reports;

pub const REPORT_STATUS_APPROVED: &str = "approved";

/// Scam report row
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = scam_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScamReport {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub scam_type: Option<String>,
    pub url: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Report fields exposed to scam check callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub scam_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub url: Option<String>,
    pub phone: Option<String>,
}

impl From<ScamReport> for ReportSummary {
    fn from(report: ScamReport) -> Self {
        Self {
            id: report.id,
            title: report.title,
            category: report.category,
            scam_type: report.scam_type,
            created_at: report.created_at,
            status: report.status,
            url: report.url,
            phone: report.phone,
        }
    }
}

impl ScamReport {
    /// Approved reports whose title, description, url or phone contains any of
    /// `terms` (case-insensitive), most recent first
    pub async fn search_approved(
        conn: &mut AsyncPgConnection,
        terms: &[String],
        limit: i64,
    ) -> QueryResult<Vec<Self>> {
        use diesel::sql_query;
        use diesel::sql_types::{Array, BigInt, Text};

        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let patterns: Vec<String> = terms
            .iter()
            .map(|term| format!("%{}%", escape_like(term)))
            .collect();

        sql_query(
            "SELECT id, title, description, category, scam_type, url, phone, status, created_at \
             FROM scam_reports \
             WHERE status = 'approved' \
               AND (title ILIKE ANY($1) \
                    OR description ILIKE ANY($1) \
                    OR url ILIKE ANY($1) \
                    OR phone ILIKE ANY($1)) \
             ORDER BY created_at DESC \
             LIMIT $2",
        )
        .bind::<Array<Text>, _>(patterns)
        .bind::<BigInt, _>(limit)
        .load::<ScamReport>(conn)
        .await
    }

    /// Most recent approved reports
    pub async fn recent_approved(
        conn: &mut AsyncPgConnection,
        limit: i64,
    ) -> QueryResult<Vec<Self>> {
        use crate::schema::scam_reports::dsl::*;

        scam_reports
            .filter(status.eq(REPORT_STATUS_APPROVED))
            .order(created_at.desc())
            .limit(limit)
            .select(ScamReport::as_select())
            .load(conn)
            .await
    }
}

/// Escape LIKE wildcards so user terms match literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
