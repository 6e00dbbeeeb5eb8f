//! Subscription domain module.
//!
//! Lifecycle of paid group access and the Stripe webhook boundary that
//! drives it.
//!
//! # Module Structure
//!
//! - `aggregate` - Subscription aggregate entity
//! - `status` - SubscriptionStatus state machine
//! - `plan` - Money, billing periods, plan and group value objects
//! - `transaction` - Checkout audit records
//! - `stripe_event` / `webhook_*` - Webhook parsing, verification, idempotency

mod aggregate;
mod errors;
mod plan;
mod status;
mod stripe_event;
mod transaction;
mod webhook_errors;
mod webhook_processor;
mod webhook_verifier;

pub use aggregate::{GatewayRefs, Subscription};
pub use errors::SubscriptionError;
pub use plan::{BillingPeriod, GroupAccess, Money, SubscriptionPlan};
pub use status::SubscriptionStatus;
pub use stripe_event::{
    CheckoutSessionPayload, InvoicePayload, ItemPrice, StripeEvent, StripeEventData,
    StripeEventType, SubscriptionItem, SubscriptionItems, SubscriptionPayload,
};
#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
pub use transaction::{PaymentTransaction, TransactionStatus};
pub use webhook_errors::WebhookError;
pub use webhook_processor::{IdempotentWebhookProcessor, WebhookDispatcher};
pub use webhook_verifier::{compute_signature_header, SignatureHeader, StripeWebhookVerifier};
