//! Value objects describing what is sold and what it unlocks.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, ValidationError};

/// Monetary amount in minor units (cents) plus ISO currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount_minor: i64,
    pub currency: String,
}

impl Money {
    pub fn new(amount_minor: i64, currency: impl Into<String>) -> Self {
        Self {
            amount_minor,
            currency: currency.into(),
        }
    }

    /// Converts a configured major-unit price (e.g. `9.99`) to minor units.
    pub fn from_major(amount: f64, currency: impl Into<String>) -> Result<Self, ValidationError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::invalid_format(
                "price",
                format!("{} is not a valid price", amount),
            ));
        }
        Ok(Self::new((amount * 100.0).round() as i64, currency))
    }

    /// Amount in major units, as shown to users and admins.
    pub fn as_major(&self) -> f64 {
        self.amount_minor as f64 / 100.0
    }

    /// Currency code in the lowercase form Stripe expects.
    pub fn gateway_currency(&self) -> String {
        self.currency.to_lowercase()
    }
}

/// Half-open billing window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl BillingPeriod {
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, ValidationError> {
        if end.is_before(&start) {
            return Err(ValidationError::invalid_format(
                "billing_period",
                "period end precedes period start",
            ));
        }
        Ok(Self { start, end })
    }

    /// Period starting at `start` and lasting `days`.
    pub fn starting_at(start: Timestamp, days: i64) -> Result<Self, ValidationError> {
        if days <= 0 {
            return Err(ValidationError::out_of_range("duration_days", 1, i64::MAX, days));
        }
        let end = start.checked_add_days(days).ok_or_else(|| {
            ValidationError::invalid_format("duration_days", "period end out of range")
        })?;
        Self::new(start, end)
    }

    /// Builds a period from Stripe's Unix-seconds pair.
    pub fn from_unix(start: i64, end: i64) -> Result<Self, ValidationError> {
        let start = Timestamp::from_unix_secs(start).ok_or_else(|| {
            ValidationError::invalid_format("current_period_start", "timestamp out of range")
        })?;
        let end = Timestamp::from_unix_secs(end).ok_or_else(|| {
            ValidationError::invalid_format("current_period_end", "timestamp out of range")
        })?;
        Self::new(start, end)
    }

    /// True once `now` has moved strictly past the end of the period.
    pub fn has_lapsed(&self, now: &Timestamp) -> bool {
        self.end.is_before(now)
    }
}

/// The single recurring plan the bot sells.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionPlan {
    pub price: Money,
    pub period_days: i64,
}

/// The private group the subscription unlocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAccess {
    pub group_id: i64,
    pub invite_link: String,
}
