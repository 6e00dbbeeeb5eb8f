//! Subscription Gate - Telegram group access sold as a Stripe subscription.
//!
//! A bot offers a recurring plan, Stripe webhooks keep subscription records
//! current, and a periodic sweep removes members whose paid period ran out.

pub mod adapters;
pub mod application;
pub mod config;
pub mod context;
pub mod domain;
pub mod ports;
