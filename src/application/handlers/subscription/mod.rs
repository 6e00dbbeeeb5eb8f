//! Subscription command and query handlers.

mod activation;
mod create_checkout_session;
mod expire_subscriptions;
mod get_subscription_stats;
mod grant_subscription;
mod handle_payment_webhook;
mod list_subscribers;

pub use create_checkout_session::{
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreateCheckoutSessionResult,
};
pub use expire_subscriptions::{ExpireSubscriptionsHandler, SweepReport};
pub use get_subscription_stats::{GetSubscriptionStatsHandler, SubscriptionStats, RECENT_TRANSACTIONS};
pub use grant_subscription::{
    GrantSubscriptionCommand, GrantSubscriptionHandler, GrantSubscriptionResult, DEFAULT_GRANT_DAYS,
    MAX_GRANT_DAYS,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, SubscriptionReconciler,
};
pub use list_subscribers::{ListSubscribersHandler, Subscriber};
