//! Stripe webhook event envelope and the payload shapes the reconciler reads.
//!
//! Payload structs capture only the fields we act on; everything else in
//! Stripe's schema is ignored. Fields that moved between API versions are
//! optional so older and newer event renderings both parse.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp.
    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,

    #[serde(default)]
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// Polymorphic on event type.
    pub object: serde_json::Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl StripeEvent {
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::from_str(&self.event_type)
    }

    /// Deserializes the data object as the specified payload type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

/// Event types the reconciler applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    CheckoutSessionCompleted,
    CustomerSubscriptionUpdated,
    CustomerSubscriptionDeleted,
    InvoicePaymentSucceeded,
    InvoicePaymentFailed,
    Unknown,
}

impl StripeEventType {
    pub fn from_str(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "customer.subscription.updated" => Self::CustomerSubscriptionUpdated,
            "customer.subscription.deleted" => Self::CustomerSubscriptionDeleted,
            "invoice.payment_succeeded" => Self::InvoicePaymentSucceeded,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::CustomerSubscriptionUpdated => "customer.subscription.updated",
            Self::CustomerSubscriptionDeleted => "customer.subscription.deleted",
            Self::InvoicePaymentSucceeded => "invoice.payment_succeeded",
            Self::InvoicePaymentFailed => "invoice.payment_failed",
            Self::Unknown => "unknown",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Payloads
// ════════════════════════════════════════════════════════════════════════════════

/// `checkout.session.completed` data object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSessionPayload {
    /// cs_...
    pub id: String,

    pub customer: Option<String>,

    pub subscription: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionPayload {
    /// Chat user id stamped on the session at creation.
    pub fn telegram_user_id(&self) -> Option<i64> {
        self.metadata
            .get("telegram_user_id")
            .and_then(|v| v.trim().parse().ok())
    }
}

/// `customer.subscription.*` data object, also the body of a subscription
/// retrieve call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubscriptionPayload {
    /// sub_...
    pub id: String,

    pub customer: Option<String>,

    pub status: String,

    /// Top-level period bounds. Newer API versions moved them to items.
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,

    #[serde(default)]
    pub items: SubscriptionItems,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubscriptionItem {
    pub price: Option<ItemPrice>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemPrice {
    pub id: String,
    pub product: Option<String>,
    pub unit_amount: Option<i64>,
    pub currency: Option<String>,
}

impl SubscriptionPayload {
    /// Period bounds, falling back to the first item when absent at top level.
    pub fn period_bounds(&self) -> Option<(i64, i64)> {
        match (self.current_period_start, self.current_period_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => {
                let item = self.items.data.first()?;
                Some((item.current_period_start?, item.current_period_end?))
            }
        }
    }

    pub fn first_price(&self) -> Option<&ItemPrice> {
        self.items.data.first().and_then(|i| i.price.as_ref())
    }
}

/// `invoice.*` data object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvoicePayload {
    /// in_...
    pub id: String,

    pub customer: Option<String>,

    /// Present on older API versions.
    pub subscription: Option<String>,

    /// Newer API versions nest the subscription under `parent`.
    #[serde(default)]
    pub parent: Option<InvoiceParent>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InvoiceParent {
    #[serde(default)]
    pub subscription_details: Option<InvoiceSubscriptionDetails>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InvoiceSubscriptionDetails {
    pub subscription: Option<String>,
}

impl InvoicePayload {
    /// Gateway subscription this invoice bills, wherever the API version put it.
    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription.as_deref().or_else(|| {
            self.parent
                .as_ref()
                .and_then(|p| p.subscription_details.as_ref())
                .and_then(|d| d.subscription.as_deref())
        })
    }
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
                previous_attributes: None,
            },
            livemode: false,
            api_version: Some("2023-10-16".to_string()),
        }
    }
}
