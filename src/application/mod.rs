//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Chat replies and notifications are composed in [`messages`]; group
//! membership side effects go through [`GroupGate`].

pub mod group_gate;
pub mod handlers;
pub mod messages;

pub use group_gate::GroupGate;
pub use handlers::{
    BotUpdateHandler, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult, ExpireSubscriptionsHandler, GetSubscriptionStatsHandler,
    GrantSubscriptionCommand, GrantSubscriptionHandler, GrantSubscriptionResult,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, ListSubscribersHandler,
    RecordStatusCheckCommand, StatusCheckHandler, Subscriber, SubscriptionReconciler,
    SubscriptionStats, SweepReport,
};
