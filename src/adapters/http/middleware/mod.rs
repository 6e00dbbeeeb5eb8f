//! HTTP middleware for axum.
//!
//! - `admin_auth` - Bearer token guard for `/api/admin/*`

mod admin_auth;

pub use admin_auth::require_admin_token;
