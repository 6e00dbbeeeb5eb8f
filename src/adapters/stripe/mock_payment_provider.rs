//! Mock payment provider for testing.
//!
//! Configurable in-process `PaymentProvider` for unit and integration tests:
//! - Gateway subscriptions served from a local table
//! - Error injection (one-shot or per method)
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, CreateCustomerRequest, Customer, GatewaySubscription,
    PaymentError, PaymentProvider,
};

/// Mock payment provider.
///
/// Clones share state, so a test can keep a handle while the application
/// holds another behind `Arc<dyn PaymentProvider>`.
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Subscriptions returned by `get_subscription`.
    subscriptions: HashMap<String, GatewaySubscription>,

    /// Checkout sessions handed out, in order.
    sessions: Vec<(CreateCheckoutRequest, CheckoutSession)>,

    next_id: u64,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Add or replace a subscription in the gateway's "database".
    pub fn add_subscription(&self, subscription: GatewaySubscription) {
        let id = subscription.id.clone();
        self.state().subscriptions.insert(id, subscription);
    }

    /// Active card subscription with the given period, in Unix seconds.
    pub fn add_active_subscription(&self, subscription_id: &str, start: i64, end: i64) {
        self.add_subscription(GatewaySubscription {
            id: subscription_id.to_string(),
            customer_id: Some("cus_mock".to_string()),
            status: "active".to_string(),
            current_period_start: Some(start),
            current_period_end: Some(end),
            product_id: Some("prod_mock".to_string()),
            price_id: Some("price_mock".to_string()),
        });
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Checkout requests received so far.
    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.state()
            .sessions
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    pub fn last_checkout_session(&self) -> Option<CheckoutSession> {
        self.state().sessions.last().map(|(_, s)| s.clone())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.state();

        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        // Global error is consumed
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state();
        state.next_id += 1;
        format!("{}_mock_{}", prefix, state.next_id)
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        self.record_call(
            "create_customer",
            vec![
                request.telegram_user_id.to_string(),
                request.username.clone().unwrap_or_default(),
            ],
        );
        self.check_error("create_customer")?;

        Ok(Customer {
            id: self.next_id("cus"),
        })
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record_call(
            "create_checkout_session",
            vec![request.customer_id.clone(), request.price_id.clone()],
        );
        self.check_error("create_checkout_session")?;

        let id = self.next_id("cs");
        let session = CheckoutSession {
            url: format!("https://checkout.stripe.com/c/pay/{}", id),
            id,
        };
        self.state().sessions.push((request, session.clone()));
        Ok(session)
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<GatewaySubscription>, PaymentError> {
        self.record_call("get_subscription", vec![subscription_id.to_string()]);
        self.check_error("get_subscription")?;

        Ok(self.state().subscriptions.get(subscription_id).cloned())
    }
}
