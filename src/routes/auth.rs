use axum::extract::State;
use tracing::{info, warn};

use super::{ApiJson, ApiPath, ApiQuery};
use crate::auth::{password, AuthUser};
use crate::entities::user;
use crate::error::AppError;
use crate::models::{
    AuthPayload, ListUsersQuery, LoginRequest, NewAccount, RegisterInvestorRequest,
    RegisterStartupRequest, RegisterUserRequest, UpdateProfileRequest, UpdateRoleRequest,
    UserEnvelope, UserPage, UserRole, UserView,
};
use crate::repositories::{UserFilter, UserRepository};
use crate::response::{ApiResponse, ErrorEnvelope};
use crate::AppState;

async fn register(
    state: &AppState,
    account: NewAccount,
) -> Result<ApiResponse<AuthPayload>, AppError> {
    info!("Registering {} account: {}", account.profile.role(), account.account.email);

    let password_hash = password::hash(&account.account.password)?;
    let model = UserRepository::new(&state.db)
        .create(&account, password_hash)
        .await?;
    let access_token = state.tokens.issue(&model)?;

    Ok(ApiResponse::created(
        "Registration successful",
        AuthPayload {
            user: UserView::try_from(model)?,
            access_token,
        },
    ))
}

pub(crate) fn user_page(
    models: Vec<user::Model>,
    next_page_token: Option<String>,
) -> Result<UserPage, AppError> {
    Ok(UserPage {
        users: models
            .into_iter()
            .map(UserView::try_from)
            .collect::<Result<_, _>>()?,
        next_page_token,
    })
}

/// Register a standard user
#[utoipa::path(
    post,
    path = "/auth/register/user",
    tag = "auth",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthPayload>),
        (status = 400, description = "Invalid registration data", body = ErrorEnvelope),
        (status = 409, description = "Email already registered", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterUserRequest>,
) -> Result<ApiResponse<AuthPayload>, AppError> {
    register(&state, NewAccount::try_from(body)?).await
}

/// Register a startup account
#[utoipa::path(
    post,
    path = "/auth/register/startup",
    tag = "auth",
    request_body = RegisterStartupRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthPayload>),
        (status = 400, description = "Invalid registration data", body = ErrorEnvelope),
        (status = 409, description = "Email already registered", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register_startup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterStartupRequest>,
) -> Result<ApiResponse<AuthPayload>, AppError> {
    register(&state, NewAccount::try_from(body)?).await
}

/// Register an investor account
#[utoipa::path(
    post,
    path = "/auth/register/investor",
    tag = "auth",
    request_body = RegisterInvestorRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthPayload>),
        (status = 400, description = "Invalid registration data", body = ErrorEnvelope),
        (status = 409, description = "Email already registered", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register_investor(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterInvestorRequest>,
) -> Result<ApiResponse<AuthPayload>, AppError> {
    register(&state, NewAccount::try_from(body)?).await
}

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<AuthPayload>),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<ApiResponse<AuthPayload>, AppError> {
    let repo = UserRepository::new(&state.db);
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let Some(model) = repo.find_by_email(&body.email).await? else {
        warn!("Login attempt for unknown email");
        return Err(invalid());
    };
    if !password::verify(&body.password, &model.password_hash)? {
        warn!("Login attempt with wrong password for {}", model.email);
        return Err(invalid());
    }

    let model = repo.touch_last_login(model).await?;
    let access_token = state.tokens.issue(&model)?;
    info!("User logged in: {}", model.email);

    Ok(ApiResponse::success(
        "Login successful",
        AuthPayload {
            user: UserView::try_from(model)?,
            access_token,
        },
    ))
}

/// The account behind the bearer token
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserEnvelope>),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn me(auth: AuthUser) -> Result<ApiResponse<UserEnvelope>, AppError> {
    Ok(ApiResponse::success(
        "User profile retrieved successfully",
        UserEnvelope {
            user: UserView::try_from(auth.user)?,
        },
    ))
}

/// Update the caller's names and role attributes
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    request_body = UpdateProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserEnvelope>),
        (status = 400, description = "Invalid profile data", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<ApiResponse<UserEnvelope>, AppError> {
    let model = UserRepository::new(&state.db)
        .update_profile(auth.user, body)
        .await?;

    Ok(ApiResponse::success(
        "Profile updated successfully",
        UserEnvelope {
            user: UserView::try_from(model)?,
        },
    ))
}

/// List accounts, newest first
#[utoipa::path(
    get,
    path = "/auth/users",
    tag = "auth",
    params(ListUsersQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "One page of users", body = ApiResponse<UserPage>),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 403, description = "Caller is not an admin", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip(state, auth))]
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> Result<ApiResponse<UserPage>, AppError> {
    auth.require_any(&[UserRole::Admin])?;

    let filter = UserFilter {
        role: query.role,
        ..Default::default()
    };
    let (models, next) = UserRepository::new(&state.db)
        .list(&filter, query.limit, query.page_token.as_deref())
        .await?;

    Ok(ApiResponse::success(
        "Users retrieved successfully",
        user_page(models, next)?,
    ))
}

/// Grant or revoke the admin role
#[utoipa::path(
    put,
    path = "/auth/users/{id}/role",
    tag = "auth",
    params(("id" = String, Path, description = "Internal user id")),
    request_body = UpdateRoleRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<UserEnvelope>),
        (status = 400, description = "Role incompatible with the account profile", body = ErrorEnvelope),
        (status = 403, description = "Caller is not an admin", body = ErrorEnvelope),
        (status = 404, description = "No user with this id", body = ErrorEnvelope)
    ),
    description = "An account can hold `admin` or the role matching its profile kind."
)]
#[tracing::instrument(skip(state, auth, body))]
pub async fn update_user_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<UpdateRoleRequest>,
) -> Result<ApiResponse<UserEnvelope>, AppError> {
    auth.require_any(&[UserRole::Admin])?;

    let model = UserRepository::new(&state.db).set_role(&id, body.role).await?;
    Ok(ApiResponse::success(
        "User role updated successfully",
        UserEnvelope {
            user: UserView::try_from(model)?,
        },
    ))
}
