//! BotUpdateHandler - reacts to chat commands and inline buttons.
//!
//! | Update | Reply |
//! |--------|-------|
//! | `/start` | registers the user; active end date + invite link, or the offer |
//! | `/admin` | subscription counts and the latest active subscribers (allow-list only) |
//! | `subscribe` button | checkout link, or the gateway's failure reason |
//! | `status` button | active end date + invite link, or the offer buttons |

use std::sync::Arc;

use crate::application::handlers::subscription::{
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
};
use crate::application::messages::{self, AdminSummaryEntry};
use crate::domain::foundation::{DomainError, TelegramUserId, Timestamp};
use crate::domain::subscription::SubscriptionPlan;
use crate::domain::user::{display_name, User};
use crate::ports::{
    BotUpdate, ButtonAction, ChatProfile, Clock, MessagingPlatform, SubscriptionRepository,
    UserRepository,
};

/// Active subscribers listed in the `/admin` reply.
const ADMIN_RECENT_LIMIT: u32 = 10;

pub struct BotUpdateHandler {
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    checkout: Arc<CreateCheckoutSessionHandler>,
    messaging: Arc<dyn MessagingPlatform>,
    plan: SubscriptionPlan,
    invite_link: String,
    admin_ids: Vec<TelegramUserId>,
    clock: Arc<dyn Clock>,
}

impl BotUpdateHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        checkout: Arc<CreateCheckoutSessionHandler>,
        messaging: Arc<dyn MessagingPlatform>,
        plan: SubscriptionPlan,
        invite_link: impl Into<String>,
        admin_ids: Vec<TelegramUserId>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            subscriptions,
            checkout,
            messaging,
            plan,
            invite_link: invite_link.into(),
            admin_ids,
            clock,
        }
    }

    pub async fn handle(&self, update: BotUpdate) -> Result<(), DomainError> {
        match update {
            BotUpdate::Command {
                chat_id,
                from,
                command,
            } => match command.as_str() {
                "start" => self.start(chat_id, from).await,
                "admin" => self.admin(chat_id, from.id).await,
                other => {
                    tracing::debug!(command = other, "Ignoring unknown command");
                    Ok(())
                }
            },
            BotUpdate::Button {
                callback_id,
                chat_id,
                message_id,
                from,
                action,
            } => {
                if let Err(e) = self.messaging.answer_callback(&callback_id).await {
                    tracing::warn!(error = %e, "Failed to answer callback query");
                }
                match action {
                    ButtonAction::Subscribe => self.subscribe(chat_id, message_id, from.id).await,
                    ButtonAction::Status => self.status(chat_id, message_id, from.id).await,
                    ButtonAction::Other(data) => {
                        tracing::debug!(data = %data, "Ignoring unknown button");
                        Ok(())
                    }
                }
            }
        }
    }

    fn is_admin(&self, user: TelegramUserId) -> bool {
        self.admin_ids.contains(&user)
    }

    async fn start(&self, chat_id: i64, from: ChatProfile) -> Result<(), DomainError> {
        let candidate = User::register(
            from.id,
            from.username,
            from.first_name,
            from.last_name,
            self.is_admin(from.id),
            self.clock.now(),
        );
        let user = self.users.insert_if_absent(&candidate).await?;
        if user.id == candidate.id {
            tracing::info!(telegram_user_id = %user.telegram_user_id, "User registered");
        }

        let reply = match self.active_period_end(user.telegram_user_id).await? {
            Some(end) => messages::welcome_active(end, &self.invite_link),
            None => messages::welcome_offer(&self.plan),
        };
        self.messaging.send_message(chat_id, reply).await?;
        Ok(())
    }

    async fn admin(&self, chat_id: i64, from: TelegramUserId) -> Result<(), DomainError> {
        if !self.is_admin(from) {
            tracing::info!(telegram_user_id = %from, "Admin command denied");
            self.messaging
                .send_message(chat_id, messages::admin_denied())
                .await?;
            return Ok(());
        }

        let counts = self.subscriptions.count_by_status().await?;
        let recent = self
            .subscriptions
            .list_active(Some(ADMIN_RECENT_LIMIT))
            .await?;

        let mut entries = Vec::with_capacity(recent.len());
        for subscription in recent {
            let username = match self
                .messaging
                .lookup_username(subscription.telegram_user_id)
                .await
            {
                Ok(name) => name,
                Err(e) => {
                    tracing::debug!(error = %e, "Username lookup failed");
                    None
                }
            };
            entries.push(AdminSummaryEntry {
                display_name: display_name(username.as_deref(), subscription.telegram_user_id),
                period_end: subscription.period_end(),
            });
        }

        self.messaging
            .send_message(
                chat_id,
                messages::admin_summary(counts.active, counts.canceled, counts.expired, &entries),
            )
            .await?;
        Ok(())
    }

    async fn subscribe(
        &self,
        chat_id: i64,
        message_id: i64,
        from: TelegramUserId,
    ) -> Result<(), DomainError> {
        let reply = match self
            .checkout
            .handle(CreateCheckoutSessionCommand {
                telegram_user_id: from,
            })
            .await
        {
            Ok(session) => messages::checkout_link(&session.checkout_url),
            Err(e) => {
                tracing::warn!(telegram_user_id = %from, error = %e, "Checkout creation failed");
                messages::checkout_failed(&e.message())
            }
        };
        self.messaging.edit_message(chat_id, message_id, reply).await?;
        Ok(())
    }

    async fn status(
        &self,
        chat_id: i64,
        message_id: i64,
        from: TelegramUserId,
    ) -> Result<(), DomainError> {
        let reply = match self.active_period_end(from).await? {
            Some(end) => messages::status_active(end, &self.invite_link),
            None => messages::status_none(),
        };
        self.messaging.edit_message(chat_id, message_id, reply).await?;
        Ok(())
    }

    async fn active_period_end(
        &self,
        user: TelegramUserId,
    ) -> Result<Option<Timestamp>, DomainError> {
        Ok(self
            .subscriptions
            .find_active_by_telegram_user(user)
            .await?
            .iter()
            .filter_map(|s| s.period_end())
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemorySubscriptionRepository, InMemoryTransactionRepository, InMemoryUserRepository,
        ManualClock,
    };
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::adapters::telegram::MockMessagingPlatform;
    use crate::domain::subscription::{BillingPeriod, Money, Subscription};
    use crate::ports::{PaymentError, PaymentProvider};

    const ADMIN: i64 = 111;
    const T0: i64 = 1_704_067_200;

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    struct Fixture {
        handler: BotUpdateHandler,
        users: Arc<InMemoryUserRepository>,
        subscriptions: Arc<InMemorySubscriptionRepository>,
        payments: MockPaymentProvider,
        messaging: MockMessagingPlatform,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let payments = MockPaymentProvider::new();
        let messaging = MockMessagingPlatform::new();
        let clock = Arc::new(ManualClock::new(Timestamp::from_unix_secs(T0).unwrap()));
        let plan = SubscriptionPlan {
            price: Money::new(10_000, "UAH"),
            period_days: 30,
        };
        let provider: Arc<dyn PaymentProvider> = Arc::new(payments.clone());
        let checkout = Arc::new(CreateCheckoutSessionHandler::new(
            users.clone(),
            Arc::new(InMemoryTransactionRepository::new()),
            provider,
            plan.clone(),
            "price_123",
            "https://gate.example.com",
            clock.clone(),
        ));
        let handler = BotUpdateHandler::new(
            users.clone(),
            subscriptions.clone(),
            checkout,
            Arc::new(messaging.clone()),
            plan,
            "https://t.me/+abc",
            vec![TelegramUserId::new(ADMIN)],
            clock.clone(),
        );
        Fixture {
            handler,
            users,
            subscriptions,
            payments,
            messaging,
            clock,
        }
    }

    fn profile(id: i64, username: Option<&str>) -> ChatProfile {
        ChatProfile {
            id: TelegramUserId::new(id),
            username: username.map(str::to_string),
            first_name: Some("Ann".to_string()),
            last_name: None,
        }
    }

    fn command(id: i64, command: &str) -> BotUpdate {
        BotUpdate::Command {
            chat_id: id,
            from: profile(id, Some("ann")),
            command: command.to_string(),
        }
    }

    fn button(id: i64, action: ButtonAction) -> BotUpdate {
        BotUpdate::Button {
            callback_id: "cb_1".to_string(),
            chat_id: id,
            message_id: 77,
            from: profile(id, Some("ann")),
            action,
        }
    }

    async fn grant(f: &Fixture, id: i64, days: i64) {
        let user = f
            .users
            .find_by_telegram_id(TelegramUserId::new(id))
            .await
            .unwrap()
            .unwrap();
        let now = f.clock.now();
        let sub = Subscription::grant_manual(
            user.id,
            user.telegram_user_id,
            Money::new(10_000, "UAH"),
            BillingPeriod::starting_at(now, days).unwrap(),
            now,
        );
        f.subscriptions.save(&sub).await.unwrap();
    }

    // ══════════════════════════════════════════════════════════════
    // /start
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn start_registers_user_and_offers_plan() {
        let f = fixture();

        f.handler.handle(command(5, "start")).await.unwrap();

        let user = f
            .users
            .find_by_telegram_id(TelegramUserId::new(5))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username.as_deref(), Some("ann"));
        assert!(!user.is_admin);
        let sent = f.messaging.sent_to(5);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message.buttons.len(), 2);
    }

    #[tokio::test]
    async fn start_twice_keeps_one_user() {
        let f = fixture();

        f.handler.handle(command(5, "start")).await.unwrap();
        f.handler.handle(command(5, "start")).await.unwrap();

        assert_eq!(f.users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn start_with_active_subscription_sends_invite() {
        let f = fixture();
        f.handler.handle(command(5, "start")).await.unwrap();
        grant(&f, 5, 30).await;
        f.messaging.clear();

        f.handler.handle(command(5, "start")).await.unwrap();

        let sent = f.messaging.sent_to(5);
        assert!(sent[0].message.text.contains("https://t.me/+abc"));
        assert!(sent[0].message.buttons.is_empty());
    }

    #[tokio::test]
    async fn admin_flag_comes_from_allow_list() {
        let f = fixture();

        f.handler.handle(command(ADMIN, "start")).await.unwrap();

        let user = f
            .users
            .find_by_telegram_id(TelegramUserId::new(ADMIN))
            .await
            .unwrap()
            .unwrap();
        assert!(user.is_admin);
    }

    // ══════════════════════════════════════════════════════════════
    // /admin
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn admin_command_denied_for_regular_user() {
        let f = fixture();

        f.handler.handle(command(5, "admin")).await.unwrap();

        assert_eq!(f.messaging.sent_to(5)[0].message, messages::admin_denied());
    }

    #[tokio::test]
    async fn admin_summary_lists_subscribers_by_username() {
        let f = fixture();
        f.handler.handle(command(5, "start")).await.unwrap();
        f.handler.handle(command(6, "start")).await.unwrap();
        grant(&f, 5, 30).await;
        grant(&f, 6, 30).await;
        f.messaging.set_username(TelegramUserId::new(5), "ann");

        f.handler.handle(command(ADMIN, "admin")).await.unwrap();

        let text = &f.messaging.sent_to(ADMIN)[0].message.text;
        assert!(text.contains("Активних: 2"));
        assert!(text.contains("@ann"));
        assert!(text.contains("ID6"));
    }

    // ══════════════════════════════════════════════════════════════
    // Buttons
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn subscribe_button_edits_message_with_checkout_link() {
        let f = fixture();
        f.handler.handle(command(5, "start")).await.unwrap();

        f.handler
            .handle(button(5, ButtonAction::Subscribe))
            .await
            .unwrap();

        assert_eq!(f.messaging.answered_callbacks(), vec!["cb_1".to_string()]);
        let edit = f.messaging.sent_to(5).pop().unwrap();
        assert_eq!(edit.edited_message_id, Some(77));
        let url = f.payments.last_checkout_session().unwrap().url;
        assert!(edit.message.text.contains(&url));
    }

    #[tokio::test]
    async fn subscribe_button_shows_gateway_error() {
        let f = fixture();
        f.handler.handle(command(5, "start")).await.unwrap();
        f.payments
            .set_method_error("create_customer", PaymentError::provider("Card declined"));

        f.handler
            .handle(button(5, ButtonAction::Subscribe))
            .await
            .unwrap();

        let edit = f.messaging.sent_to(5).pop().unwrap();
        assert!(edit.message.text.contains("Card declined"));
    }

    #[tokio::test]
    async fn status_button_without_subscription_offers_plan() {
        let f = fixture();
        f.handler.handle(command(5, "start")).await.unwrap();

        f.handler
            .handle(button(5, ButtonAction::Status))
            .await
            .unwrap();

        let edit = f.messaging.sent_to(5).pop().unwrap();
        assert_eq!(edit.message, messages::status_none());
    }

    #[tokio::test]
    async fn status_button_with_subscription_shows_end_date() {
        let f = fixture();
        f.handler.handle(command(5, "start")).await.unwrap();
        grant(&f, 5, 30).await;

        f.handler
            .handle(button(5, ButtonAction::Status))
            .await
            .unwrap();

        let end = f.clock.now().add_days(30);
        let edit = f.messaging.sent_to(5).pop().unwrap();
        assert_eq!(edit.message, messages::status_active(end, "https://t.me/+abc"));
    }
}
