//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `SubscriptionRepository` - subscription records (source of truth)
//! - `UserRepository` - chat user profiles
//! - `TransactionRepository` - checkout audit trail
//! - `WebhookEventRepository` - Stripe webhook idempotency tracking
//! - `StatusCheckRepository` - diagnostic records
//!
//! ## External Service Ports
//!
//! - `PaymentProvider` - Stripe customers, checkout sessions, subscriptions
//! - `MessagingPlatform` - Telegram messages and group membership
//! - `Clock` - time source

mod clock;
mod messaging_platform;
mod payment_provider;
mod status_check_repository;
mod subscription_repository;
mod transaction_repository;
mod user_repository;
mod webhook_event_repository;

pub use clock::{Clock, SystemClock};
pub use messaging_platform::{
    BotUpdate, ButtonAction, ChatProfile, InlineButton, MessagingError, MessagingPlatform,
    OutgoingMessage,
};
pub use payment_provider::{
    CheckoutSession, CreateCheckoutRequest, CreateCustomerRequest, Customer, GatewaySubscription,
    PaymentError, PaymentErrorCode, PaymentProvider,
};
pub use status_check_repository::StatusCheckRepository;
pub use subscription_repository::{SubscriptionCounts, SubscriptionRepository};
pub use transaction_repository::TransactionRepository;
pub use user_repository::UserRepository;
pub use webhook_event_repository::{
    SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome, WebhookResult,
    STALE_CLAIM_SECS,
};
