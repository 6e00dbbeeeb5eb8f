//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `SUBSCRIPTION_GATE`
//! prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use subscription_gate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod payment;
mod server;
mod subscription;
mod telegram;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{LogFormat, ServerConfig};
pub use subscription::SubscriptionConfig;
pub use telegram::TelegramConfig;

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, logging, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Payment configuration (Stripe)
    pub payment: PaymentConfig,

    /// Bot and group configuration (Telegram)
    pub telegram: TelegramConfig,

    /// Plan and sweep configuration
    pub subscription: SubscriptionConfig,

    /// Bearer token required on `/api/admin/*` when set
    #[serde(default)]
    pub admin_api_token: Option<Secret<String>>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SUBSCRIPTION_GATE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `SUBSCRIPTION_GATE__SERVER__PORT=8001` -> `server.port = 8001`
    /// - `SUBSCRIPTION_GATE__TELEGRAM__BOT_TOKEN=...` -> `telegram.bot_token = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or cannot be
    /// parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUBSCRIPTION_GATE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        self.telegram.validate()?;
        self.subscription.validate()?;
        Ok(())
    }

    /// Admin token, treating an empty value as unset.
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_api_token
            .as_ref()
            .map(|t| t.expose_secret().as_str())
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[(&str, &str)] = &[
        ("SUBSCRIPTION_GATE__DATABASE__URL", "postgresql://test@localhost/test"),
        ("SUBSCRIPTION_GATE__PAYMENT__STRIPE_API_KEY", "sk_test_xxx"),
        ("SUBSCRIPTION_GATE__PAYMENT__STRIPE_WEBHOOK_SECRET", "whsec_xxx"),
        ("SUBSCRIPTION_GATE__PAYMENT__STRIPE_PRICE_ID", "price_123"),
        ("SUBSCRIPTION_GATE__TELEGRAM__BOT_TOKEN", "123456:ABC-DEF"),
        ("SUBSCRIPTION_GATE__TELEGRAM__GROUP_ID", "-1001234567890"),
        ("SUBSCRIPTION_GATE__TELEGRAM__GROUP_INVITE_LINK", "https://t.me/+abc"),
        ("SUBSCRIPTION_GATE__TELEGRAM__ADMIN_USER_IDS", "111,222"),
        ("SUBSCRIPTION_GATE__SUBSCRIPTION__PRICE", "9.99"),
        ("SUBSCRIPTION_GATE__SUBSCRIPTION__DAYS", "30"),
        ("SUBSCRIPTION_GATE__SUBSCRIPTION__CURRENCY", "UAH"),
        ("SUBSCRIPTION_GATE__SUBSCRIPTION__DOMAIN", "https://gate.example.com"),
    ];

    fn set_minimal_env() {
        for (key, value) in VARS {
            env::set_var(key, value);
        }
    }

    fn clear_env() {
        for (key, _) in VARS {
            env::remove_var(key);
        }
        env::remove_var("SUBSCRIPTION_GATE__SERVER__PORT");
        env::remove_var("SUBSCRIPTION_GATE__ADMIN_API_TOKEN");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.telegram.group_id, -1001234567890);
        assert_eq!(config.subscription.days, 30);
        assert!(config.admin_token().is_none());
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().validate().is_ok());
    }

    #[test]
    fn test_missing_payment_section_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::remove_var("SUBSCRIPTION_GATE__PAYMENT__STRIPE_API_KEY");
        env::remove_var("SUBSCRIPTION_GATE__PAYMENT__STRIPE_WEBHOOK_SECRET");
        env::remove_var("SUBSCRIPTION_GATE__PAYMENT__STRIPE_PRICE_ID");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_custom_server_port_and_admin_token() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SUBSCRIPTION_GATE__SERVER__PORT", "3000");
        env::set_var("SUBSCRIPTION_GATE__ADMIN_API_TOKEN", "s3cret");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.admin_token(), Some("s3cret"));
    }
}
