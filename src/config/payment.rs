//! Payment configuration (Stripe)

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key
    pub stripe_api_key: Secret<String>,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: Secret<String>,

    /// Recurring price the bot sells
    #[serde(default)]
    pub stripe_price_id: String,

    /// Stripe API base URL, overridable for local stubs
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl PaymentConfig {
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let api_key = self.stripe_api_key.expose_secret();
        let webhook_secret = self.stripe_webhook_secret.expose_secret();

        if api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
        }
        if webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_WEBHOOK_SECRET"));
        }
        if self.stripe_price_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_PRICE_ID"));
        }

        // Verify key prefixes for safety
        if !api_key.starts_with("sk_") && !api_key.starts_with("rk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if !self.stripe_price_id.starts_with("price_") {
            return Err(ValidationError::InvalidStripePriceId);
        }

        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str, secret: &str, price: &str) -> PaymentConfig {
        PaymentConfig {
            stripe_api_key: Secret::new(api_key.to_string()),
            stripe_webhook_secret: Secret::new(secret.to_string()),
            stripe_price_id: price.to_string(),
            api_base_url: default_api_base_url(),
        }
    }

    #[test]
    fn test_is_test_mode() {
        assert!(config("sk_test_xxx", "whsec_xxx", "price_1").is_test_mode());
        assert!(!config("sk_live_xxx", "whsec_xxx", "price_1").is_test_mode());
    }

    #[test]
    fn test_valid_config() {
        assert!(config("sk_test_xxx", "whsec_xxx", "price_1").validate().is_ok());
    }

    #[test]
    fn test_missing_price_id() {
        assert_eq!(
            config("sk_test_xxx", "whsec_xxx", "").validate(),
            Err(ValidationError::MissingRequired("PAYMENT__STRIPE_PRICE_ID"))
        );
    }

    #[test]
    fn test_invalid_key_prefixes() {
        assert_eq!(
            config("pk_test_xxx", "whsec_xxx", "price_1").validate(),
            Err(ValidationError::InvalidStripeKey)
        );
        assert_eq!(
            config("sk_test_xxx", "secret", "price_1").validate(),
            Err(ValidationError::InvalidStripeWebhookSecret)
        );
        assert_eq!(
            config("sk_test_xxx", "whsec_xxx", "prod_1").validate(),
            Err(ValidationError::InvalidStripePriceId)
        );
    }

    #[test]
    fn test_debug_does_not_leak_secrets() {
        let rendered = format!("{:?}", config("sk_test_supersecret", "whsec_hidden", "price_1"));
        assert!(!rendered.contains("supersecret"));
        assert!(!rendered.contains("hidden"));
    }
}
