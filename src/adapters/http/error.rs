//! Error responses for the `/api` routes.
//!
//! # HTTP Status Mapping
//!
//! | Error | Status | `error_code` |
//! |-------|--------|--------------|
//! | UserNotFound | 404 | `USER_NOT_FOUND` |
//! | AlreadyActive | 409 | `SUBSCRIPTION_ALREADY_ACTIVE` |
//! | ValidationFailed | 400 | `VALIDATION_FAILED` |
//! | PaymentFailed | 502 | `EXTERNAL_SERVICE_ERROR` |
//! | Infrastructure | 500 | `INTERNAL_ERROR` |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::subscription::{SubscriptionError, WebhookError};

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Stable code for programmatic handling.
    pub error_code: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_code: error_code.into(),
        }
    }
}

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub struct AdminApiError(SubscriptionError);

impl From<SubscriptionError> for AdminApiError {
    fn from(err: SubscriptionError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for AdminApiError {
    fn from(err: DomainError) -> Self {
        Self(SubscriptionError::from(err))
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SubscriptionError::UserNotFound(_) => StatusCode::NOT_FOUND,
            SubscriptionError::AlreadyActive(_) => StatusCode::CONFLICT,
            SubscriptionError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            SubscriptionError::PaymentFailed { .. } => StatusCode::BAD_GATEWAY,
            SubscriptionError::Infrastructure(detail) => {
                tracing::error!(error = %detail, "Admin request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}

/// Webhook rejection or processing failure.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let code = if status.is_server_error() {
            tracing::error!(error = %self.0, "Webhook processing failed");
            ErrorCode::InternalError
        } else {
            ErrorCode::ValidationFailed
        };
        let body = ErrorResponse::new(code.to_string(), self.0.to_string());
        (status, Json(body)).into_response()
    }
}
