//! Subscription plan and sweep configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::subscription::{Money, SubscriptionPlan};

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfig {
    /// Price in major units, as shown to users
    pub price: f64,

    /// Length of one paid period in days
    pub days: i64,

    /// ISO currency code
    #[serde(default)]
    pub currency: String,

    /// Public base URL used for checkout redirects
    #[serde(default)]
    pub domain: String,

    /// Seconds between expiry sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Days processed webhook events are kept
    #[serde(default = "default_event_retention_days")]
    pub event_retention_days: i64,
}

impl SubscriptionConfig {
    /// The plan offered to users.
    pub fn plan(&self) -> Result<SubscriptionPlan, ValidationError> {
        let price = Money::from_major(self.price, self.currency.to_uppercase())
            .map_err(|_| ValidationError::InvalidPrice)?;
        Ok(SubscriptionPlan {
            price,
            period_days: self.days,
        })
    }

    /// Domain without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.domain.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.plan()?;
        if self.days <= 0 {
            return Err(ValidationError::InvalidDuration);
        }
        if self.currency.is_empty() {
            return Err(ValidationError::MissingRequired("SUBSCRIPTION__CURRENCY"));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency);
        }
        if self.domain.is_empty() {
            return Err(ValidationError::MissingRequired("SUBSCRIPTION__DOMAIN"));
        }
        if !self.domain.starts_with("https://") && !self.domain.starts_with("http://") {
            return Err(ValidationError::InvalidDomain);
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval("sweep_interval_secs"));
        }
        if self.event_retention_days <= 0 {
            return Err(ValidationError::InvalidInterval("event_retention_days"));
        }
        Ok(())
    }
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_event_retention_days() -> i64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SubscriptionConfig {
        SubscriptionConfig {
            price: 9.99,
            days: 30,
            currency: "uah".to_string(),
            domain: "https://gate.example.com/".to_string(),
            sweep_interval_secs: default_sweep_interval(),
            event_retention_days: default_event_retention_days(),
        }
    }

    #[test]
    fn plan_converts_price_to_minor_units() {
        let plan = config().plan().unwrap();
        assert_eq!(plan.price.amount_minor, 999);
        assert_eq!(plan.price.currency, "UAH");
        assert_eq!(plan.period_days, 30);
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        assert_eq!(config().base_url(), "https://gate.example.com");
    }

    #[test]
    fn rejects_non_positive_days() {
        let cfg = SubscriptionConfig { days: 0, ..config() };
        assert_eq!(cfg.validate(), Err(ValidationError::InvalidDuration));
    }

    #[test]
    fn rejects_negative_price() {
        let cfg = SubscriptionConfig { price: -1.0, ..config() };
        assert_eq!(cfg.validate(), Err(ValidationError::InvalidPrice));
    }

    #[test]
    fn rejects_bad_currency() {
        let cfg = SubscriptionConfig {
            currency: "hryvnia".to_string(),
            ..config()
        };
        assert_eq!(cfg.validate(), Err(ValidationError::InvalidCurrency));
    }

    #[test]
    fn rejects_domain_without_scheme() {
        let cfg = SubscriptionConfig {
            domain: "gate.example.com".to_string(),
            ..config()
        };
        assert_eq!(cfg.validate(), Err(ValidationError::InvalidDomain));
    }
}
