//! Axum routes for the webhook and admin endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::adapters::http::middleware::require_admin_token;
use crate::adapters::http::state::ApiState;
use super::handlers::{add_subscriber, get_stats, list_subscribers, stripe_webhook};

/// # Routes
///
/// ## Webhook Endpoints (no auth, signature verified)
/// - `POST /stripe-webhook`
///
/// ## Admin Endpoints (bearer token when configured)
/// - `GET /admin/subscribers`
/// - `POST /admin/add-subscriber`
/// - `GET /admin/stats`
pub fn subscription_routes(state: ApiState) -> Router<ApiState> {
    let admin = Router::new()
        .route("/subscribers", get(list_subscribers))
        .route("/add-subscriber", post(add_subscriber))
        .route("/stats", get(get_stats))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token));

    Router::new()
        .route("/stripe-webhook", post(stripe_webhook))
        .nest("/admin", admin)
}
