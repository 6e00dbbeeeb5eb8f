//! HTTP handlers for the Stripe webhook and admin endpoints.

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use crate::application::{GrantSubscriptionCommand, HandlePaymentWebhookCommand};
use crate::domain::subscription::WebhookError;

use crate::adapters::http::error::{AdminApiError, WebhookApiError};
use crate::adapters::http::state::ApiState;
use super::dto::{
    AddSubscriberRequest, StatsResponse, SubscriberResponse, SubscribersResponse,
    SuccessResponse, WebhookAck,
};

/// POST /api/stripe-webhook - Apply a signed Stripe event
pub async fn stripe_webhook(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| WebhookError::ParseError("Missing Stripe-Signature header".to_string()))?;

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };
    state.webhook.handle(cmd).await?;

    Ok(Json(WebhookAck::success()))
}

/// GET /api/admin/subscribers - Active subscribers with contact details
pub async fn list_subscribers(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, AdminApiError> {
    let subscribers = state.subscribers.handle(None).await?;
    Ok(Json(SubscribersResponse {
        subscribers: subscribers
            .into_iter()
            .map(SubscriberResponse::from)
            .collect(),
    }))
}

/// POST /api/admin/add-subscriber - Grant a subscription without payment
pub async fn add_subscriber(
    State(state): State<ApiState>,
    Json(request): Json<AddSubscriberRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    state
        .grant
        .handle(GrantSubscriptionCommand {
            telegram_username: request.telegram_username,
            email: request.email,
            duration_days: request.duration_days,
        })
        .await?;

    Ok(Json(SuccessResponse {
        success: true,
        message: "Subscriber added successfully".to_string(),
    }))
}

/// GET /api/admin/stats - Counts, revenue and recent payments
pub async fn get_stats(State(state): State<ApiState>) -> Result<impl IntoResponse, AdminApiError> {
    let stats = state.stats.handle().await?;
    Ok(Json(StatsResponse::from(stats)))
}
