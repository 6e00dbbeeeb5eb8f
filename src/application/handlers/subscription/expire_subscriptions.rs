//! ExpireSubscriptionsHandler - revokes access for lapsed subscriptions.

use std::sync::Arc;

use crate::application::group_gate::GroupGate;
use crate::application::messages;
use crate::domain::foundation::DomainError;
use crate::ports::{Clock, SubscriptionRepository, WebhookEventRepository};

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Rows this sweep moved to `expired`.
    pub expired: usize,
    /// Rows renewed or expired by someone else between the scan and the update.
    pub skipped: usize,
    /// Rows whose update failed; retried on the next sweep.
    pub failed: usize,
}

pub struct ExpireSubscriptionsHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    webhook_events: Arc<dyn WebhookEventRepository>,
    gate: GroupGate,
    clock: Arc<dyn Clock>,
    event_retention_days: i64,
}

impl ExpireSubscriptionsHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        webhook_events: Arc<dyn WebhookEventRepository>,
        gate: GroupGate,
        clock: Arc<dyn Clock>,
        event_retention_days: i64,
    ) -> Self {
        Self {
            subscriptions,
            webhook_events,
            gate,
            clock,
            event_retention_days,
        }
    }

    /// Expires every active subscription whose period has ended.
    ///
    /// Each row is expired with a conditional update, so a renewal that lands
    /// mid-sweep wins and overlapping sweeps evict a user only once.
    pub async fn handle(&self) -> Result<SweepReport, DomainError> {
        let now = self.clock.now();
        let lapsed = self.subscriptions.find_lapsed(now).await?;
        let mut report = SweepReport::default();

        for subscription in lapsed {
            match self.subscriptions.expire_if_lapsed(&subscription.id, now).await {
                Ok(true) => {
                    report.expired += 1;
                    tracing::info!(
                        subscription_id = %subscription.id,
                        telegram_user_id = %subscription.telegram_user_id,
                        "Subscription expired"
                    );
                    self.gate
                        .evict_and_notify(
                            subscription.telegram_user_id,
                            messages::subscription_expired(),
                        )
                        .await;
                }
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        subscription_id = %subscription.id,
                        error = %e,
                        "Failed to expire subscription"
                    );
                }
            }
        }

        Ok(report)
    }

    /// Deletes processed webhook records older than the retention window.
    pub async fn purge_processed_events(&self) -> Result<u64, DomainError> {
        let cutoff = self.clock.now().add_days(-self.event_retention_days);
        let deleted = self.webhook_events.delete_before(cutoff).await?;
        if deleted > 0 {
            tracing::info!(deleted, "Purged processed webhook events");
        }
        Ok(deleted)
    }
}
