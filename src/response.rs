//! Response envelope shared by every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Successful response: `{success, message, data?, timestamp}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human readable summary
    pub message: String,
    /// Payload, absent when there is nothing to return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Time the response was produced
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            timestamp: Utc::now(),
            status: StatusCode::OK,
        }
    }

    /// Same envelope, answered with `201 Created`.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::success(message, data)
        }
    }

    /// A failed outcome that is still reported with `200 OK` (best-effort operations).
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            timestamp: Utc::now(),
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// Error body, same shape as [`ApiResponse`] without `data`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Always false
    pub success: bool,
    /// What went wrong
    pub message: String,
    /// Time the response was produced
    pub timestamp: DateTime<Utc>,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_omits_data() {
        let body = serde_json::to_value(ApiResponse::<u32>::failure("nope")).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "nope");
        assert!(body.get("data").is_none());
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn created_answers_201() {
        let response = ApiResponse::created("made", 1u32).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
