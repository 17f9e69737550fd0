use axum::extract::State;

use super::{auth::user_page, ApiQuery};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{InvestorProfilesQuery, StartupProfilesQuery, UserPage, UserRole};
use crate::repositories::{UserFilter, UserRepository};
use crate::response::{ApiResponse, ErrorEnvelope};
use crate::AppState;

/// Startup accounts, for investors and admins
#[utoipa::path(
    get,
    path = "/profiles/startups",
    tag = "profiles",
    params(StartupProfilesQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "One page of startup accounts", body = ApiResponse<UserPage>),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 403, description = "Caller is neither investor nor admin", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip(state, auth))]
pub async fn startup_profiles(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<StartupProfilesQuery>,
) -> Result<ApiResponse<UserPage>, AppError> {
    auth.require_any(&[UserRole::Investor, UserRole::Admin])?;

    let filter = UserFilter {
        role: Some(UserRole::Startup),
        sector: query.sector.filter(|s| !s.is_empty()),
        ..Default::default()
    };
    let (models, next) = UserRepository::new(&state.db)
        .list(&filter, query.limit, query.page_token.as_deref())
        .await?;

    Ok(ApiResponse::success(
        "Startup profiles retrieved successfully",
        user_page(models, next)?,
    ))
}

/// Investor accounts, for startups and admins
#[utoipa::path(
    get,
    path = "/profiles/investors",
    tag = "profiles",
    params(InvestorProfilesQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "One page of investor accounts", body = ApiResponse<UserPage>),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 403, description = "Caller is neither startup nor admin", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip(state, auth))]
pub async fn investor_profiles(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<InvestorProfilesQuery>,
) -> Result<ApiResponse<UserPage>, AppError> {
    auth.require_any(&[UserRole::Startup, UserRole::Admin])?;

    let filter = UserFilter {
        role: Some(UserRole::Investor),
        investor_type: query.investor_type,
        ..Default::default()
    };
    let (models, next) = UserRepository::new(&state.db)
        .list(&filter, query.limit, query.page_token.as_deref())
        .await?;

    Ok(ApiResponse::success(
        "Investor profiles retrieved successfully",
        user_page(models, next)?,
    ))
}
