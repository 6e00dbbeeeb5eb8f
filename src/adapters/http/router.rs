//! `/api` router and the tower layers wrapped around it.

use std::time::Duration;

use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::diagnostics::diagnostics_routes;
use super::error::ErrorResponse;
use super::state::ApiState;
use super::subscription::subscription_routes;

/// Every endpoint, mounted under `/api`. Unknown paths get a JSON 404.
pub fn api_router(state: ApiState) -> Router {
    let api = diagnostics_routes().merge(subscription_routes(state.clone()));
    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
}

/// Request id, tracing, CORS and timeout layers.
pub fn with_http_layers(router: Router, config: &ServerConfig) -> Router {
    router
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(cors_layer(&config.cors_origins_list()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Any origin when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("NOT_FOUND", "Not Found")),
    )
}
