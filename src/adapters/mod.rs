//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `postgres` - PostgreSQL repositories (production storage)
//! - `memory` - In-memory repositories and a manual clock (tests, local runs)
//! - `stripe` - Stripe payment provider
//! - `telegram` - Telegram Bot API client and update poller
//! - `http` - Axum routes under `/api`
//! - `scheduler` - Periodic expiry sweep

pub mod http;
pub mod memory;
pub mod postgres;
pub mod scheduler;
pub mod stripe;
pub mod telegram;
