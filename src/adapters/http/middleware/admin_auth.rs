//! Bearer token guard for the admin endpoints.
//!
//! ```text
//! Authorization: Bearer <admin_api_token>
//! ```
//!
//! With no token configured the guard lets every request through.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::adapters::http::error::ErrorResponse;
use crate::adapters::http::state::ApiState;

pub async fn require_admin_token(
    State(state): State<ApiState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.admin_token.as_deref() else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match presented {
        Some(token) if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) => {
            next.run(request).await
        }
        _ => {
            tracing::warn!(path = %request.uri().path(), "Rejected admin request");
            let body = ErrorResponse::new("UNAUTHORIZED", "Missing or invalid admin token");
            (StatusCode::UNAUTHORIZED, Json(body)).into_response()
        }
    }
}
