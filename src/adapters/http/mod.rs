//! HTTP adapter - the `/api` REST surface.
//!
//! - `diagnostics` - service banner and status checks
//! - `subscription` - Stripe webhook and admin endpoints
//! - `middleware` - admin bearer token guard

mod diagnostics;
mod error;
mod middleware;
mod router;
mod state;
pub mod subscription;

pub use diagnostics::{RootResponse, StatusCheckResponse, ROOT_MESSAGE};
pub use error::{AdminApiError, ErrorResponse, WebhookApiError};
pub use router::{api_router, with_http_layers};
pub use state::ApiState;
