//! UpdatePoller - long-polls the Bot API and feeds the bot handler.
//!
//! ## Offsets
//!
//! Each `getUpdates` call passes the id after the last update seen, which
//! acknowledges everything before it. An update whose handler fails is still
//! acknowledged: replaying a chat command later is worse than dropping it.
//!
//! ## Graceful Shutdown
//!
//! The loop stops at the next shutdown signal, abandoning an in-flight poll.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::application::BotUpdateHandler;

use super::client::TelegramBotClient;
use super::types::Update;

#[derive(Debug, Clone)]
pub struct UpdatePollerConfig {
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,

    /// Pause after a failed poll.
    pub error_backoff: Duration,
}

impl Default for UpdatePollerConfig {
    fn default() -> Self {
        Self {
            poll_timeout_secs: 30,
            error_backoff: Duration::from_secs(5),
        }
    }
}

pub struct UpdatePoller {
    client: TelegramBotClient,
    handler: Arc<BotUpdateHandler>,
    config: UpdatePollerConfig,
}

impl UpdatePoller {
    pub fn new(
        client: TelegramBotClient,
        handler: Arc<BotUpdateHandler>,
        config: UpdatePollerConfig,
    ) -> Self {
        Self {
            client,
            handler,
            config,
        }
    }

    /// Run the polling loop until shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut offset = 0;
        tracing::info!(timeout_secs = self.config.poll_timeout_secs, "Bot update polling started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Bot update polling stopped");
                        return;
                    }
                }

                result = self.client.get_updates(offset, self.config.poll_timeout_secs) => {
                    match result {
                        Ok(updates) => offset = self.dispatch(updates, offset).await,
                        Err(e) => {
                            tracing::warn!(error = %e, "getUpdates failed");
                            tokio::select! {
                                _ = shutdown.changed() => {}
                                _ = time::sleep(self.config.error_backoff) => {}
                            }
                        }
                    }
                }
            }
        }
    }

    /// Handles a batch in order and returns the next offset.
    pub async fn dispatch(&self, updates: Vec<Update>, mut offset: i64) -> i64 {
        for update in updates {
            offset = offset.max(update.update_id + 1);
            let update_id = update.update_id;
            let Some(bot_update) = update.into_bot_update() else {
                tracing::debug!(update_id, "Skipping update without a handled payload");
                continue;
            };
            if let Err(e) = self.handler.handle(bot_update).await {
                tracing::error!(update_id, error = %e, "Bot update handling failed");
            }
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemorySubscriptionRepository, InMemoryTransactionRepository, InMemoryUserRepository,
    };
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::adapters::telegram::MockMessagingPlatform;
    use crate::application::CreateCheckoutSessionHandler;
    use crate::domain::foundation::TelegramUserId;
    use crate::domain::subscription::{Money, SubscriptionPlan};
    use crate::ports::{SystemClock, UserRepository};
    use secrecy::Secret;

    fn poller(users: Arc<InMemoryUserRepository>, messaging: MockMessagingPlatform) -> UpdatePoller {
        let plan = SubscriptionPlan {
            price: Money::new(100, "UAH"),
            period_days: 30,
        };
        let checkout = Arc::new(CreateCheckoutSessionHandler::new(
            users.clone(),
            Arc::new(InMemoryTransactionRepository::new()),
            Arc::new(MockPaymentProvider::new()),
            plan.clone(),
            "price_1",
            "https://gate.example.com",
            Arc::new(SystemClock),
        ));
        let handler = Arc::new(BotUpdateHandler::new(
            users,
            Arc::new(InMemorySubscriptionRepository::new()),
            checkout,
            Arc::new(messaging),
            plan,
            "https://t.me/+abc",
            Vec::new(),
            Arc::new(SystemClock),
        ));
        UpdatePoller::new(
            TelegramBotClient::new(Secret::new("1:x".to_string()), "http://127.0.0.1:9"),
            handler,
            UpdatePollerConfig::default(),
        )
    }

    fn update(json: serde_json::Value) -> Update {
        serde_json::from_value(json).unwrap()
    }

    #[tokio::test]
    async fn dispatch_handles_commands_and_advances_offset() {
        let users = Arc::new(InMemoryUserRepository::new());
        let messaging = MockMessagingPlatform::new();
        let poller = poller(users.clone(), messaging.clone());

        let next = poller
            .dispatch(
                vec![
                    update(serde_json::json!({
                        "update_id": 10,
                        "message": {
                            "message_id": 1,
                            "chat": {"id": 5},
                            "from": {"id": 5, "username": "ann"},
                            "text": "/start"
                        }
                    })),
                    update(serde_json::json!({"update_id": 11})),
                ],
                0,
            )
            .await;

        assert_eq!(next, 12);
        assert!(users
            .find_by_telegram_id(TelegramUserId::new(5))
            .await
            .unwrap()
            .is_some());
        assert_eq!(messaging.sent_to(5).len(), 1);
    }

    #[tokio::test]
    async fn failed_handler_still_acknowledges_update() {
        let users = Arc::new(InMemoryUserRepository::new());
        let messaging = MockMessagingPlatform::new();
        messaging.set_failing(true);
        let poller = poller(users, messaging);

        let next = poller
            .dispatch(
                vec![update(serde_json::json!({
                    "update_id": 3,
                    "message": {
                        "message_id": 1,
                        "chat": {"id": 5},
                        "from": {"id": 5},
                        "text": "/start"
                    }
                }))],
                0,
            )
            .await;

        assert_eq!(next, 4);
    }
}
