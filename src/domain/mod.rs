//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `subscription` - Subscription lifecycle, payments and the webhook boundary
//! - `user` - Chat user profiles
//! - `status_check` - Diagnostic records

pub mod foundation;
pub mod status_check;
pub mod subscription;
pub mod user;
