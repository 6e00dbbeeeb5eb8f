//! ExpirySweeper - background task revoking lapsed subscriptions.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 300s | Time between sweeps |
//!
//! Every tick runs one expiry sweep and then purges old processed webhook
//! events. A failed tick is logged and retried on the next one.
//!
//! ## Graceful Shutdown
//!
//! The task listens for a shutdown signal and stops between ticks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::application::{ExpireSubscriptionsHandler, SweepReport};

#[derive(Debug, Clone)]
pub struct ExpirySweeperConfig {
    pub interval: Duration,
}

impl Default for ExpirySweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
        }
    }
}

impl ExpirySweeperConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

pub struct ExpirySweeper {
    handler: Arc<ExpireSubscriptionsHandler>,
    config: ExpirySweeperConfig,
}

impl ExpirySweeper {
    pub fn new(handler: Arc<ExpireSubscriptionsHandler>, config: ExpirySweeperConfig) -> Self {
        Self { handler, config }
    }

    /// Run the sweep loop until shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval_secs = self.config.interval.as_secs(), "Expiry sweeper started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Expiry sweeper stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// One sweep followed by event retention cleanup.
    pub async fn tick(&self) -> Option<SweepReport> {
        let report = match self.handler.handle().await {
            Ok(report) => {
                if report != SweepReport::default() {
                    tracing::info!(
                        expired = report.expired,
                        skipped = report.skipped,
                        failed = report.failed,
                        "Expiry sweep finished"
                    );
                }
                Some(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Expiry sweep failed");
                None
            }
        };

        if let Err(e) = self.handler.purge_processed_events().await {
            tracing::error!(error = %e, "Webhook event purge failed");
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemorySubscriptionRepository, InMemoryWebhookEventRepository, ManualClock,
    };
    use crate::adapters::telegram::MockMessagingPlatform;
    use crate::application::GroupGate;
    use crate::domain::foundation::{TelegramUserId, Timestamp, UserId};
    use crate::domain::subscription::{BillingPeriod, GroupAccess, Money, Subscription};
    use crate::ports::{Clock, SubscriptionRepository};

    fn sweeper(
        subscriptions: Arc<InMemorySubscriptionRepository>,
        clock: Arc<ManualClock>,
        interval: Duration,
    ) -> ExpirySweeper {
        let gate = GroupGate::new(
            Arc::new(MockMessagingPlatform::new()),
            GroupAccess {
                group_id: -1,
                invite_link: "https://t.me/+abc".to_string(),
            },
        );
        let handler = ExpireSubscriptionsHandler::new(
            subscriptions,
            Arc::new(InMemoryWebhookEventRepository::new()),
            gate,
            clock,
            30,
        );
        ExpirySweeper::new(
            Arc::new(handler),
            ExpirySweeperConfig::default().with_interval(interval),
        )
    }

    #[tokio::test]
    async fn tick_expires_lapsed_subscription() {
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let clock = Arc::new(ManualClock::new(Timestamp::from_unix_secs(0).unwrap()));
        let now = clock.now();
        let sub = Subscription::grant_manual(
            UserId::new(),
            TelegramUserId::new(1),
            Money::new(1, "UAH"),
            BillingPeriod::starting_at(now, 1).unwrap(),
            now,
        );
        subscriptions.save(&sub).await.unwrap();
        clock.advance_days(2);

        let report = sweeper(subscriptions.clone(), clock, Duration::from_secs(60))
            .tick()
            .await
            .unwrap();

        assert_eq!(report.expired, 1);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let clock = Arc::new(ManualClock::new(Timestamp::from_unix_secs(0).unwrap()));
        let sweeper = sweeper(
            Arc::new(InMemorySubscriptionRepository::new()),
            clock,
            Duration::from_millis(10),
        );
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn(async move { sweeper.run(rx).await });
        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
