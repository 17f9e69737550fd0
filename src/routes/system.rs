use std::collections::BTreeMap;

use axum::extract::State;

use crate::models::{ApiInfo, HealthStatus};
use crate::response::ApiResponse;
use crate::AppState;

/// API information and entry points
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "API information", body = ApiResponse<ApiInfo>)
    )
)]
pub async fn root() -> ApiResponse<ApiInfo> {
    let endpoints = BTreeMap::from([
        ("startups".to_string(), "/startups".to_string()),
        ("auth".to_string(), "/auth".to_string()),
        ("profiles".to_string(), "/profiles".to_string()),
        ("documentation".to_string(), "/docs".to_string()),
    ]);

    ApiResponse::success(
        "Welcome to the JEB Incubator API",
        ApiInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            endpoints,
        },
    )
}

/// Liveness probe, also reports whether the database answers
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up", body = ApiResponse<HealthStatus>)
    )
)]
pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthStatus> {
    let database = state.db.ping().await.is_ok();
    ApiResponse::success(
        "Service is healthy",
        HealthStatus {
            status: "ok".to_string(),
            database,
        },
    )
}
