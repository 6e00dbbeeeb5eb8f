//! HTTP DTOs for the webhook and admin endpoints.

use serde::{Deserialize, Serialize};

use crate::application::{Subscriber, SubscriptionStats};
use crate::domain::subscription::PaymentTransaction;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/admin/add-subscriber`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddSubscriberRequest {
    pub telegram_username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub duration_days: Option<i64>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
}

impl WebhookAck {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberResponse {
    pub id: String,
    pub telegram_user_id: i64,
    pub telegram_username: Option<String>,
    pub email: Option<String>,
    /// RFC 3339.
    pub current_period_end: Option<String>,
    pub created_at: String,
    /// Major units.
    pub amount: f64,
    pub currency: String,
}

impl From<Subscriber> for SubscriberResponse {
    fn from(subscriber: Subscriber) -> Self {
        let Subscriber { subscription, user } = subscriber;
        let (telegram_username, email) = match user {
            Some(user) => (user.username, user.email),
            None => (None, None),
        };
        Self {
            id: subscription.id.to_string(),
            telegram_user_id: subscription.telegram_user_id.as_i64(),
            telegram_username,
            email,
            current_period_end: subscription.period_end().map(|t| t.to_rfc3339()),
            created_at: subscription.created_at.to_rfc3339(),
            amount: subscription.price.as_major(),
            currency: subscription.price.currency,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribersResponse {
    pub subscribers: Vec<SubscriberResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: String,
    pub telegram_user_id: i64,
    pub stripe_session_id: String,
    pub stripe_subscription_id: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub created_at: String,
}

impl From<PaymentTransaction> for TransactionResponse {
    fn from(tx: PaymentTransaction) -> Self {
        Self {
            id: tx.id.to_string(),
            telegram_user_id: tx.telegram_user_id.as_i64(),
            stripe_session_id: tx.checkout_session_id,
            stripe_subscription_id: tx.gateway_subscription_id,
            amount: tx.amount.as_major(),
            currency: tx.amount.currency,
            status: tx.status.to_string(),
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_users: u64,
    pub active_subscriptions: u64,
    pub expired_subscriptions: u64,
    pub canceled_subscriptions: u64,
    /// Major units.
    pub total_revenue: f64,
    pub recent_transactions: Vec<TransactionResponse>,
}

impl From<SubscriptionStats> for StatsResponse {
    fn from(stats: SubscriptionStats) -> Self {
        Self {
            total_users: stats.total_users,
            active_subscriptions: stats.counts.active,
            expired_subscriptions: stats.counts.expired,
            canceled_subscriptions: stats.counts.canceled,
            total_revenue: stats.total_revenue.as_major(),
            recent_transactions: stats
                .recent_transactions
                .into_iter()
                .map(TransactionResponse::from)
                .collect(),
        }
    }
}
