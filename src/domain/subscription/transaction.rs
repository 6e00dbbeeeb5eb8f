//! Checkout attempts, correlated to subscriptions once the gateway confirms.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{TelegramUserId, Timestamp, TransactionId, UserId};

use super::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Initiated,
    Completed,
    Failed,
    Canceled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Initiated => "initiated",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "initiated" => Some(TransactionStatus::Initiated),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            "canceled" | "cancelled" => Some(TransactionStatus::Canceled),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record of a checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub telegram_user_id: TelegramUserId,
    pub checkout_session_id: String,
    pub gateway_subscription_id: Option<String>,
    pub amount: Money,
    pub status: TransactionStatus,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentTransaction {
    /// Records a checkout session that was just handed to the user.
    pub fn initiate(
        user_id: UserId,
        telegram_user_id: TelegramUserId,
        checkout_session_id: impl Into<String>,
        amount: Money,
        now: Timestamp,
    ) -> Self {
        let checkout_session_id = checkout_session_id.into();
        Self {
            id: TransactionId::new(),
            user_id,
            telegram_user_id,
            metadata: serde_json::json!({ "checkout_session_id": checkout_session_id }),
            checkout_session_id,
            gateway_subscription_id: None,
            amount,
            status: TransactionStatus::Initiated,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the checkout as paid and links the gateway subscription.
    pub fn complete(&mut self, gateway_subscription_id: Option<String>, now: Timestamp) {
        self.status = TransactionStatus::Completed;
        if gateway_subscription_id.is_some() {
            self.gateway_subscription_id = gateway_subscription_id;
        }
        self.updated_at = now;
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction() -> PaymentTransaction {
        PaymentTransaction::initiate(
            UserId::new(),
            TelegramUserId::new(42),
            "cs_test_1",
            Money::new(999, "UAH"),
            Timestamp::from_unix_secs(1_000).unwrap(),
        )
    }

    #[test]
    fn initiate_records_session_in_metadata() {
        let tx = transaction();
        assert_eq!(tx.status, TransactionStatus::Initiated);
        assert_eq!(tx.metadata["checkout_session_id"], "cs_test_1");
        assert!(tx.gateway_subscription_id.is_none());
    }

    #[test]
    fn complete_links_gateway_subscription() {
        let mut tx = transaction();
        let later = Timestamp::from_unix_secs(2_000).unwrap();
        tx.complete(Some("sub_S1".to_string()), later);

        assert!(tx.is_completed());
        assert_eq!(tx.gateway_subscription_id.as_deref(), Some("sub_S1"));
        assert_eq!(tx.updated_at, later);
    }

    #[test]
    fn status_parses_storage_form() {
        for status in [
            TransactionStatus::Initiated,
            TransactionStatus::Completed,
            TransactionStatus::Failed,
            TransactionStatus::Canceled,
        ] {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
    }
}
