//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API using
//! form-encoded requests authenticated with the secret key.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key);
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;

use crate::config::PaymentConfig;
use crate::domain::subscription::SubscriptionPayload;
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, CreateCustomerRequest, Customer, GatewaySubscription,
    PaymentError, PaymentErrorCode, PaymentProvider,
};

use super::api_types::{StripeCheckoutSession, StripeCustomer, StripeErrorBody};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: Secret<String>,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self {
            api_key: config.stripe_api_key.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, PaymentError> {
        let response = self
            .http_client
            .post(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(operation, status, error = %body, "Stripe request failed");
            return Err(api_error(status, &body));
        }

        parse_body(response).await
    }
}

async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PaymentError> {
    response.json().await.map_err(|e| {
        PaymentError::new(
            PaymentErrorCode::ProviderError,
            format!("Failed to parse Stripe response: {}", e),
        )
    })
}

/// Maps a non-2xx Stripe response to a `PaymentError`.
fn api_error(status: u16, body: &str) -> PaymentError {
    let detail = serde_json::from_str::<StripeErrorBody>(body).ok().map(|b| b.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| format!("Stripe API error (HTTP {})", status));

    let code = match status {
        401 | 403 => PaymentErrorCode::AuthenticationError,
        404 => PaymentErrorCode::NotFound,
        429 => PaymentErrorCode::RateLimitExceeded,
        400..=499 => PaymentErrorCode::InvalidRequest,
        _ => PaymentErrorCode::ProviderError,
    };

    let error = PaymentError::new(code, message);
    match detail.and_then(|d| d.code.or(d.error_type)) {
        Some(provider_code) => error.with_provider_code(provider_code),
        None => error,
    }
}

fn customer_params(request: &CreateCustomerRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![(
        "metadata[telegram_user_id]",
        request.telegram_user_id.to_string(),
    )];
    params.push((
        "metadata[telegram_username]",
        request.username.clone().unwrap_or_default(),
    ));
    if let Some(email) = &request.email {
        params.push(("email", email.clone()));
    }
    params
}

fn checkout_params(request: &CreateCheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("customer", request.customer_id.clone()),
        ("mode", "subscription".to_string()),
        ("payment_method_types[0]", "card".to_string()),
        ("line_items[0][price]", request.price_id.clone()),
        ("line_items[0][quantity]", "1".to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("metadata[telegram_user_id]", request.telegram_user_id.to_string()),
        ("metadata[user_id]", request.user_id.to_string()),
    ]
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        let customer: StripeCustomer = self
            .post_form("create_customer", "/v1/customers", &customer_params(&request))
            .await?;

        tracing::debug!(
            customer_id = %customer.id,
            telegram_user_id = %request.telegram_user_id,
            "Stripe customer created"
        );
        Ok(Customer { id: customer.id })
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let session: StripeCheckoutSession = self
            .post_form(
                "create_checkout_session",
                "/v1/checkout/sessions",
                &checkout_params(&request),
            )
            .await?;

        let url = session.url.ok_or_else(|| {
            PaymentError::provider(format!("Checkout session {} has no URL", session.id))
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<GatewaySubscription>, PaymentError> {
        let response = self
            .http_client
            .get(self.url(&format!("/v1/subscriptions/{}", subscription_id)))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                subscription_id,
                status,
                error = %body,
                "Stripe get_subscription failed"
            );
            return Err(api_error(status, &body));
        }

        let payload: SubscriptionPayload = parse_body(response).await?;
        Ok(Some(GatewaySubscription::from(payload)))
    }
}
