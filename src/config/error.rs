//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Invalid Stripe price ID format")]
    InvalidStripePriceId,

    #[error("Invalid admin user id: {0}")]
    InvalidAdminUserId(String),

    #[error("Invalid group invite link")]
    InvalidInviteLink,

    #[error("Subscription price must be a non-negative number")]
    InvalidPrice,

    #[error("Subscription duration must be at least one day")]
    InvalidDuration,

    #[error("Currency must be a three-letter ISO code")]
    InvalidCurrency,

    #[error("Public domain must be an http(s) URL")]
    InvalidDomain,

    #[error("Interval must be greater than zero: {0}")]
    InvalidInterval(&'static str),
}
