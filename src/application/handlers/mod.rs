//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod bot;
pub mod diagnostics;
pub mod subscription;

pub use bot::BotUpdateHandler;
pub use diagnostics::{RecordStatusCheckCommand, StatusCheckHandler, STATUS_CHECK_LIST_LIMIT};
pub use subscription::{
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreateCheckoutSessionResult,
    ExpireSubscriptionsHandler, GetSubscriptionStatsHandler, GrantSubscriptionCommand,
    GrantSubscriptionHandler, GrantSubscriptionResult, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler, ListSubscribersHandler, Subscriber, SubscriptionReconciler,
    SubscriptionStats, SweepReport, DEFAULT_GRANT_DAYS, RECENT_TRANSACTIONS,
};
