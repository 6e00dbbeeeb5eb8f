//! Composition root.
//!
//! Builds every application handler from a set of ports and the settings
//! derived from [`AppConfig`]. Production wires Postgres, Stripe and
//! Telegram adapters; tests wire the in-memory ones through the same path.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::adapters::http::ApiState;
use crate::adapters::postgres::{
    PostgresStatusCheckRepository, PostgresSubscriptionRepository, PostgresTransactionRepository,
    PostgresUserRepository, PostgresWebhookEventRepository,
};
use crate::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use crate::adapters::telegram::TelegramBotClient;
use crate::application::{
    BotUpdateHandler, CreateCheckoutSessionHandler, ExpireSubscriptionsHandler,
    GetSubscriptionStatsHandler, GrantSubscriptionHandler, GroupGate, HandlePaymentWebhookHandler,
    ListSubscribersHandler, StatusCheckHandler, SubscriptionReconciler,
};
use crate::config::{AppConfig, ValidationError};
use crate::domain::foundation::TelegramUserId;
use crate::domain::subscription::{GroupAccess, StripeWebhookVerifier, SubscriptionPlan};
use crate::ports::{
    Clock, MessagingPlatform, PaymentProvider, StatusCheckRepository, SubscriptionRepository,
    SystemClock, TransactionRepository, UserRepository, WebhookEventRepository,
};

/// Every external dependency the handlers need.
#[derive(Clone)]
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
    pub status_checks: Arc<dyn StatusCheckRepository>,
    pub payments: Arc<dyn PaymentProvider>,
    pub messaging: Arc<dyn MessagingPlatform>,
    pub clock: Arc<dyn Clock>,
}

impl Ports {
    /// Postgres storage with the live Stripe and Telegram clients.
    pub fn production(pool: PgPool, config: &AppConfig, bot: TelegramBotClient) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
            transactions: Arc::new(PostgresTransactionRepository::new(pool.clone())),
            webhook_events: Arc::new(PostgresWebhookEventRepository::new(pool.clone())),
            status_checks: Arc::new(PostgresStatusCheckRepository::new(pool)),
            payments: Arc::new(StripePaymentAdapter::new(StripeConfig::from_payment_config(
                &config.payment,
            ))),
            messaging: Arc::new(bot),
            clock: Arc::new(SystemClock),
        }
    }
}

/// Business settings resolved from configuration.
#[derive(Clone)]
pub struct GateSettings {
    pub plan: SubscriptionPlan,
    pub group: GroupAccess,
    pub stripe_price_id: String,
    pub webhook_secret: String,
    pub base_url: String,
    pub admin_ids: Vec<TelegramUserId>,
    pub admin_token: Option<String>,
    pub event_retention_days: i64,
}

impl GateSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            plan: config.subscription.plan()?,
            group: GroupAccess {
                group_id: config.telegram.group_id,
                invite_link: config.telegram.group_invite_link.clone(),
            },
            stripe_price_id: config.payment.stripe_price_id.clone(),
            webhook_secret: config.payment.stripe_webhook_secret.expose_secret().clone(),
            base_url: config.subscription.base_url().to_string(),
            admin_ids: config.telegram.admin_ids()?,
            admin_token: config.admin_token().map(str::to_string),
            event_retention_days: config.subscription.event_retention_days,
        })
    }
}

/// Fully wired application handlers.
pub struct AppContext {
    pub api: ApiState,
    pub bot: Arc<BotUpdateHandler>,
    pub sweeper: Arc<ExpireSubscriptionsHandler>,
}

impl AppContext {
    pub fn new(ports: Ports, settings: GateSettings) -> Self {
        let gate = GroupGate::new(ports.messaging.clone(), settings.group.clone());

        let reconciler = SubscriptionReconciler::new(
            ports.subscriptions.clone(),
            ports.transactions.clone(),
            ports.payments.clone(),
            gate.clone(),
            ports.clock.clone(),
        );
        let webhook = HandlePaymentWebhookHandler::new(
            StripeWebhookVerifier::new(settings.webhook_secret),
            ports.webhook_events.clone(),
            reconciler,
            ports.clock.clone(),
        );

        let checkout = Arc::new(CreateCheckoutSessionHandler::new(
            ports.users.clone(),
            ports.transactions.clone(),
            ports.payments.clone(),
            settings.plan.clone(),
            settings.stripe_price_id,
            settings.base_url,
            ports.clock.clone(),
        ));

        let bot = BotUpdateHandler::new(
            ports.users.clone(),
            ports.subscriptions.clone(),
            checkout,
            ports.messaging.clone(),
            settings.plan.clone(),
            settings.group.invite_link.clone(),
            settings.admin_ids,
            ports.clock.clone(),
        );

        let sweeper = ExpireSubscriptionsHandler::new(
            ports.subscriptions.clone(),
            ports.webhook_events.clone(),
            gate.clone(),
            ports.clock.clone(),
            settings.event_retention_days,
        );

        let api = ApiState {
            webhook: Arc::new(webhook),
            grant: Arc::new(GrantSubscriptionHandler::new(
                ports.users.clone(),
                ports.subscriptions.clone(),
                gate,
                settings.plan.clone(),
                ports.clock.clone(),
            )),
            subscribers: Arc::new(ListSubscribersHandler::new(
                ports.subscriptions.clone(),
                ports.users.clone(),
            )),
            stats: Arc::new(GetSubscriptionStatsHandler::new(
                ports.users,
                ports.subscriptions,
                ports.transactions,
                settings.plan.price.currency.clone(),
            )),
            status_checks: Arc::new(StatusCheckHandler::new(ports.status_checks, ports.clock)),
            admin_token: settings.admin_token.map(Arc::from),
        };

        Self {
            api,
            bot: Arc::new(bot),
            sweeper: Arc::new(sweeper),
        }
    }
}
