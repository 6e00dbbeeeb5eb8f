//! Subscription repository port.
//!
//! Persists [`Subscription`] records. Many historical rows may exist per chat
//! user; callers keep at most one of them `active`.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SubscriptionId, TelegramUserId, Timestamp};
use crate::domain::subscription::Subscription;

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new subscription.
    ///
    /// # Errors
    ///
    /// - `SubscriptionAlreadyActive` if the insert would create a second
    ///   active row for the same chat user
    /// - `DatabaseError` on persistence failure
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Overwrite status, period and gateway refs of an existing subscription.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the row does not exist
    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    /// Lookup by gateway subscription id (`sub_...`).
    async fn find_by_gateway_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Active rows for a chat user. Normally zero or one.
    async fn find_active_by_telegram_user(
        &self,
        telegram_user_id: TelegramUserId,
    ) -> Result<Vec<Subscription>, DomainError>;

    /// Active rows whose period ended strictly before `now`.
    async fn find_lapsed(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError>;

    /// Sets `expired` only if the row is still active and still lapsed at
    /// `now`. Returns true when this call performed the transition.
    async fn expire_if_lapsed(
        &self,
        id: &SubscriptionId,
        now: Timestamp,
    ) -> Result<bool, DomainError>;

    /// Active rows, newest first, optionally limited.
    async fn list_active(&self, limit: Option<u32>) -> Result<Vec<Subscription>, DomainError>;

    async fn count_by_status(&self) -> Result<SubscriptionCounts, DomainError>;
}

/// Row counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriptionCounts {
    pub pending: u64,
    pub active: u64,
    pub canceled: u64,
    pub expired: u64,
}
