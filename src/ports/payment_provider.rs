//! Payment provider port for external payment processing.
//!
//! Covers the three gateway calls the subscription flow makes: registering a
//! customer, opening a subscription-mode checkout, and reading a subscription
//! back while reconciling webhooks. Signature checks on incoming webhooks are
//! done locally and are not part of this port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, TelegramUserId, UserId};
use crate::domain::subscription::SubscriptionPayload;

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a customer in the payment system.
    async fn create_customer(&self, request: CreateCustomerRequest)
        -> Result<Customer, PaymentError>;

    /// Create a subscription-mode checkout session for a recurring price.
    ///
    /// Returns a URL for the customer to complete payment.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Get subscription by provider ID.
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<GatewaySubscription>, PaymentError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    /// Stored as `telegram_user_id` metadata.
    pub telegram_user_id: TelegramUserId,

    /// Stored as `telegram_username` metadata.
    pub username: Option<String>,

    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Provider's customer ID.
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    pub customer_id: String,

    /// Recurring price to subscribe to.
    pub price_id: String,

    /// Echoed back as session metadata on `checkout.session.completed`.
    pub telegram_user_id: TelegramUserId,
    pub user_id: UserId,

    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID.
    pub id: String,

    /// URL for customer to complete checkout.
    pub url: String,
}

/// Subscription as the gateway currently sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySubscription {
    pub id: String,
    pub customer_id: Option<String>,

    /// Raw gateway status (`active`, `past_due`, `canceled`, ...).
    pub status: String,

    /// Unix seconds.
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,

    pub product_id: Option<String>,
    pub price_id: Option<String>,
}

impl From<SubscriptionPayload> for GatewaySubscription {
    fn from(payload: SubscriptionPayload) -> Self {
        let period = payload.period_bounds();
        let price = payload.first_price().cloned();
        Self {
            id: payload.id,
            customer_id: payload.customer,
            status: payload.status,
            current_period_start: period.map(|(start, _)| start),
            current_period_end: period.map(|(_, end)| end),
            product_id: price.as_ref().and_then(|p| p.product.clone()),
            price_id: price.map(|p| p.id),
        }
    }
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    pub code: PaymentErrorCode,

    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    pub retryable: bool,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        use crate::domain::foundation::ErrorCode;

        let code = match err.code {
            PaymentErrorCode::NotFound => ErrorCode::NotFound,
            _ => ErrorCode::ExternalServiceError,
        };

        DomainError::new(code, err.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    NetworkError,
    AuthenticationError,
    InvalidRequest,
    NotFound,
    RateLimitExceeded,
    ProviderError,
    Unknown,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::RateLimitExceeded
                | PaymentErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderError => "provider_error",
            PaymentErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
