//! In-memory SubscriptionRepository.
//!
//! Mirrors the database constraints: gateway subscription ids are unique and
//! a chat user holds at most one active row.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    DomainError, ErrorCode, SubscriptionId, TelegramUserId, Timestamp,
};
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::ports::{SubscriptionCounts, SubscriptionRepository};

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    rows: RwLock<HashMap<SubscriptionId, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored row, oldest first.
    pub async fn all(&self) -> Vec<Subscription> {
        let mut rows: Vec<_> = self.rows.read().await.values().cloned().collect();
        rows.sort_by_key(|s| *s.created_at.as_datetime());
        rows
    }
}

fn check_constraints(
    rows: &HashMap<SubscriptionId, Subscription>,
    candidate: &Subscription,
) -> Result<(), DomainError> {
    for other in rows.values().filter(|s| s.id != candidate.id) {
        if candidate.is_active()
            && other.is_active()
            && other.telegram_user_id == candidate.telegram_user_id
        {
            return Err(DomainError::new(
                ErrorCode::SubscriptionAlreadyActive,
                "User already has an active subscription",
            ));
        }
        if candidate.gateway.subscription_id.is_some()
            && other.gateway.subscription_id == candidate.gateway.subscription_id
        {
            return Err(DomainError::database(
                "Duplicate gateway subscription id",
            ));
        }
    }
    Ok(())
}

fn newest_first(mut rows: Vec<Subscription>) -> Vec<Subscription> {
    rows.sort_by(|a, b| b.created_at.as_datetime().cmp(a.created_at.as_datetime()));
    rows
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&subscription.id) {
            return Err(DomainError::database("Duplicate subscription id"));
        }
        check_constraints(&rows, subscription)?;
        rows.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&subscription.id) {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            ));
        }
        check_constraints(&rows, subscription)?;
        rows.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn find_by_gateway_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|s| s.gateway.subscription_id.as_deref() == Some(gateway_subscription_id))
            .cloned())
    }

    async fn find_active_by_telegram_user(
        &self,
        telegram_user_id: TelegramUserId,
    ) -> Result<Vec<Subscription>, DomainError> {
        let rows = self
            .rows
            .read()
            .await
            .values()
            .filter(|s| s.is_active() && s.telegram_user_id == telegram_user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows))
    }

    async fn find_lapsed(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        let mut rows: Vec<_> = self
            .rows
            .read()
            .await
            .values()
            .filter(|s| s.is_lapsed(&now))
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.period_end());
        Ok(rows)
    }

    async fn expire_if_lapsed(
        &self,
        id: &SubscriptionId,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(id) {
            Some(sub) if sub.is_lapsed(&now) => {
                sub.expire(now)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_active(&self, limit: Option<u32>) -> Result<Vec<Subscription>, DomainError> {
        let rows = self
            .rows
            .read()
            .await
            .values()
            .filter(|s| s.is_active())
            .cloned()
            .collect();
        let mut rows = newest_first(rows);
        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn count_by_status(&self) -> Result<SubscriptionCounts, DomainError> {
        let mut counts = SubscriptionCounts::default();
        for sub in self.rows.read().await.values() {
            match sub.status {
                SubscriptionStatus::Pending => counts.pending += 1,
                SubscriptionStatus::Active => counts.active += 1,
                SubscriptionStatus::Canceled => counts.canceled += 1,
                SubscriptionStatus::Expired => counts.expired += 1,
            }
        }
        Ok(counts)
    }
}
