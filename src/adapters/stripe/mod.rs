//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Stripe integration:
//! - Customer creation with chat identity metadata
//! - Subscription-mode checkout sessions
//! - Subscription retrieval during webhook reconciliation
//!
//! Webhook signature verification lives in the domain
//! (`StripeWebhookVerifier`) since it needs no network access.

mod api_types;
mod mock_payment_provider;
mod stripe_adapter;

pub use api_types::{StripeApiError, StripeCheckoutSession, StripeCustomer, StripeErrorBody};
pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
