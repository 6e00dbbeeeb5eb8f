//! Root and status check endpoints.

use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::adapters::http::error::AdminApiError;
use crate::adapters::http::state::ApiState;
use crate::application::RecordStatusCheckCommand;
use crate::domain::status_check::StatusCheck;

pub const ROOT_MESSAGE: &str = "Telegram Bot with Stripe Subscriptions";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusCheckRequest {
    pub client_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCheckResponse {
    pub id: String,
    pub client_name: String,
    pub timestamp: String,
}

impl From<StatusCheck> for StatusCheckResponse {
    fn from(check: StatusCheck) -> Self {
        Self {
            id: check.id.to_string(),
            client_name: check.client_name,
            timestamp: check.timestamp.to_rfc3339(),
        }
    }
}

/// - `GET /` - Service banner
/// - `POST /status` - Record a status check
/// - `GET /status` - List status checks
pub fn diagnostics_routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(root))
        .route("/status", get(list_status_checks).post(create_status_check))
}

async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

async fn create_status_check(
    State(state): State<ApiState>,
    Json(request): Json<StatusCheckRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let check = state
        .status_checks
        .record(RecordStatusCheckCommand {
            client_name: request.client_name,
        })
        .await?;
    Ok(Json(StatusCheckResponse::from(check)))
}

async fn list_status_checks(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, AdminApiError> {
    let checks = state.status_checks.list().await?;
    Ok(Json(
        checks
            .into_iter()
            .map(StatusCheckResponse::from)
            .collect::<Vec<_>>(),
    ))
}
