use axum::extract::State;
use tracing::{error, info};

use super::{ApiPath, ApiQuery};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::jobs::StartupSync;
use crate::models::{
    ConnectionStatus, ListStartupsQuery, SectorCount, StartupPage, StartupResponse, StartupStats,
    SyncReport, UserRole,
};
use crate::repositories::{ListParams, StartupRepository, StartupWithFounders};
use crate::response::{ApiResponse, ErrorEnvelope};
use crate::AppState;

fn to_response(item: StartupWithFounders) -> StartupResponse {
    StartupResponse::new(item.startup, item.founders)
}

/// List mirrored startups, newest first
#[utoipa::path(
    get,
    path = "/startups",
    tag = "startups",
    params(ListStartupsQuery),
    responses(
        (status = 200, description = "One page of startups", body = ApiResponse<StartupPage>),
        (status = 400, description = "Malformed query", body = ErrorEnvelope)
    ),
    description = "Filters by exact sector unless it is absent or \"all\", then matches `search` case-insensitively against name, description and sector."
)]
#[tracing::instrument(skip(state))]
pub async fn list_startups(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListStartupsQuery>,
) -> Result<ApiResponse<StartupPage>, AppError> {
    let params = ListParams::new(query.page, query.limit, query.sector, query.search);
    let page = StartupRepository::new(&state.db).find_all(&params).await?;

    let page = page.map(to_response);
    Ok(ApiResponse::success(
        "Startups retrieved successfully",
        StartupPage {
            data: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
        },
    ))
}

/// Get one startup with its founders
#[utoipa::path(
    get,
    path = "/startups/{id}",
    tag = "startups",
    params(("id" = String, Path, description = "Internal startup id")),
    responses(
        (status = 200, description = "Startup found", body = ApiResponse<StartupResponse>),
        (status = 404, description = "No startup with this id", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_startup(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<ApiResponse<StartupResponse>, AppError> {
    let startup = StartupRepository::new(&state.db)
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::RecordNotFound(format!("Startup with ID {} not found", id)))?;

    Ok(ApiResponse::success(
        "Startup retrieved successfully",
        to_response(startup),
    ))
}

/// Delete a startup and its founders
#[utoipa::path(
    delete,
    path = "/startups/{id}",
    tag = "startups",
    params(("id" = String, Path, description = "Internal startup id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Startup deleted", body = ApiResponse<String>),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 403, description = "Caller is not an admin", body = ErrorEnvelope),
        (status = 404, description = "No startup with this id", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip(state, auth))]
pub async fn delete_startup(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> Result<ApiResponse<String>, AppError> {
    auth.require_any(&[UserRole::Admin])?;

    if !StartupRepository::new(&state.db).delete(&id).await? {
        return Err(AppError::RecordNotFound(format!("Startup with ID {} not found", id)));
    }

    info!("Startup {} deleted by {}", id, auth.user.email);
    Ok(ApiResponse::success("Startup deleted successfully", id))
}

/// Startup count per sector
#[utoipa::path(
    get,
    path = "/startups/sectors",
    tag = "startups",
    responses(
        (status = 200, description = "Sectors with their startup count", body = ApiResponse<Vec<SectorCount>>)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_sectors(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<SectorCount>>, AppError> {
    let sectors = StartupRepository::new(&state.db).sectors().await?;
    Ok(ApiResponse::success("Sectors retrieved successfully", sectors))
}

/// Headline figures for the incubator
#[utoipa::path(
    get,
    path = "/startups/stats",
    tag = "startups",
    responses(
        (status = 200, description = "Statistics", body = ApiResponse<StartupStats>)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_stats(State(state): State<AppState>) -> Result<ApiResponse<StartupStats>, AppError> {
    let total_projects = StartupRepository::new(&state.db).count().await?;
    Ok(ApiResponse::success(
        "Stats retrieved successfully",
        StartupStats::with_project_count(total_projects),
    ))
}

/// Pull startups from the JEB API into the local store
#[utoipa::path(
    post,
    path = "/startups/sync",
    tag = "startups",
    responses(
        (status = 200, description = "Sync outcome. `success` is false when the JEB API listing could not be fetched", body = ApiResponse<SyncReport>)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn sync_startups(State(state): State<AppState>) -> ApiResponse<SyncReport> {
    let sync = StartupSync::new(
        &state.db,
        state.upstream.as_ref(),
        state.config.sync_page_limit,
    );

    match sync.synchronize().await {
        Ok(summary) => {
            let report = SyncReport::from(summary);
            ApiResponse::success(report.message.clone(), report)
        }
        Err(e) => {
            error!("Startup sync failed: {}", e);
            ApiResponse::failure(format!("Failed to sync with JEB API: {}", e))
        }
    }
}

/// Check that the JEB API is reachable with the configured credentials
#[utoipa::path(
    get,
    path = "/startups/sync/status",
    tag = "startups",
    responses(
        (status = 200, description = "Connection test result", body = ApiResponse<ConnectionStatus>)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn sync_status(State(state): State<AppState>) -> ApiResponse<ConnectionStatus> {
    let status = StartupSync::new(
        &state.db,
        state.upstream.as_ref(),
        state.config.sync_page_limit,
    )
    .test_connection()
    .await;

    let message = status.message.clone();
    ApiResponse::success(message, status)
}
