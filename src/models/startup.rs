use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{founder, startup};
use crate::jobs::startup_sync::SyncSummary;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Fixed headline figures reported next to the live project count.
pub const TOTAL_FUNDING: u64 = 50_000_000;
pub const SUCCESS_RATE: u32 = 85;
pub const JOBS_CREATED: u32 = 500;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListStartupsQuery {
    /// 1-based page number (default: 1)
    pub page: Option<u64>,
    /// Items per page, capped at 100 (default: 20)
    pub limit: Option<u64>,
    /// Exact sector to keep; "all" disables the filter
    pub sector: Option<String>,
    /// Case-insensitive text matched against name, description and sector
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FounderResponse {
    pub id: String,
    /// Founder id in the JEB API
    pub jeb_id: i64,
    pub name: String,
    /// Internal id of the owning startup
    pub startup_id: String,
}

impl From<founder::Model> for FounderResponse {
    fn from(model: founder::Model) -> Self {
        Self {
            id: model.id,
            jeb_id: model.jeb_id,
            name: model.name,
            startup_id: model.startup_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartupResponse {
    /// Internal identifier
    pub id: String,
    /// Identifier in the JEB API
    pub jeb_id: i64,
    pub name: String,
    pub legal_status: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    /// Creation date reported by the JEB API
    pub created_at: Option<DateTime<Utc>>,
    pub description: String,
    pub website_url: Option<String>,
    pub social_media_url: Option<String>,
    pub project_status: Option<String>,
    pub needs: Option<String>,
    pub sector: String,
    pub maturity: String,
    pub founders: Vec<FounderResponse>,
}

impl StartupResponse {
    pub fn new(model: startup::Model, founders: Vec<founder::Model>) -> Self {
        Self {
            id: model.id,
            jeb_id: model.jeb_id,
            name: model.name,
            legal_status: model.legal_status,
            address: model.address,
            email: model.email,
            phone: model.phone,
            created_at: model.created_at,
            description: model.description,
            website_url: model.website_url,
            social_media_url: model.social_media_url,
            project_status: model.project_status,
            needs: model.needs,
            sector: model.sector,
            maturity: model.maturity,
            founders: founders.into_iter().map(FounderResponse::from).collect(),
        }
    }
}

/// One page of the startup listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartupPage {
    pub data: Vec<StartupResponse>,
    /// Matching startups across all pages
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SectorCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartupStats {
    pub total_projects: u64,
    pub total_funding: u64,
    /// Percentage
    pub success_rate: u32,
    pub jobs_created: u32,
}

impl StartupStats {
    pub fn with_project_count(total_projects: u64) -> Self {
        Self {
            total_projects,
            total_funding: TOTAL_FUNDING,
            success_rate: SUCCESS_RATE,
            jobs_created: JOBS_CREATED,
        }
    }
}

/// Outcome of `POST /startups/sync`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SyncReport {
    pub success: bool,
    pub message: String,
    pub created: u64,
    pub updated: u64,
    /// Upstream summaries seen
    pub total: u64,
    /// Records skipped because their detail or their write failed
    pub failures: u64,
}

impl From<SyncSummary> for SyncReport {
    fn from(summary: SyncSummary) -> Self {
        Self {
            success: true,
            message: summary.message(),
            created: summary.created,
            updated: summary.updated,
            total: summary.total,
            failures: summary.failures,
        }
    }
}

/// Result of probing the JEB API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConnectionStatus {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiInfo {
    pub name: String,
    pub version: String,
    /// Entry points keyed by area
    pub endpoints: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub database: bool,
}
