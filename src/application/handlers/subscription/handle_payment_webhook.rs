//! HandlePaymentWebhookHandler - verifies and applies Stripe webhooks.
//!
//! | Event | Correlation | Effect | Side effect |
//! |-------|-------------|--------|-------------|
//! | `checkout.session.completed` | transaction by session id | new active subscription | invite link |
//! | `customer.subscription.updated` | subscription by gateway id | status and period synced | none |
//! | `customer.subscription.deleted` | subscription by gateway id | canceled | evict + notify |
//! | `invoice.payment_succeeded` | subscription by gateway id | renewed | renewal notice |
//! | `invoice.payment_failed` | subscription by gateway id | none | update payment notice |
//!
//! Missing correlations and impossible transitions are acknowledged as
//! ignored so Stripe does not keep redelivering them.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::application::group_gate::GroupGate;
use crate::application::messages;
use crate::domain::foundation::{DomainError, ErrorCode, TelegramUserId};
use crate::domain::subscription::{
    BillingPeriod, CheckoutSessionPayload, GatewayRefs, IdempotentWebhookProcessor,
    InvoicePayload, StripeEvent, StripeEventType, StripeWebhookVerifier, Subscription,
    SubscriptionPayload, SubscriptionStatus, WebhookDispatcher, WebhookError,
};
use crate::ports::{
    Clock, GatewaySubscription, PaymentError, PaymentProvider, SubscriptionRepository,
    TransactionRepository, WebhookEventRepository, WebhookResult,
};

use super::activation::supersede_active;

/// Raw delivery as received on the webhook endpoint.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: String,
}

/// Authenticates deliveries and applies each event at most once.
pub struct HandlePaymentWebhookHandler {
    verifier: StripeWebhookVerifier,
    processor: IdempotentWebhookProcessor<SubscriptionReconciler>,
    clock: Arc<dyn Clock>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        verifier: StripeWebhookVerifier,
        webhook_events: Arc<dyn WebhookEventRepository>,
        reconciler: SubscriptionReconciler,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            processor: IdempotentWebhookProcessor::new(webhook_events, reconciler, clock.clone()),
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<WebhookResult, WebhookError> {
        let event = self
            .verifier
            .verify_and_parse_at(&cmd.payload, &cmd.signature, self.clock.now().as_unix_secs())
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected webhook delivery");
                e
            })?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.is_live(),
            "Stripe webhook received"
        );

        self.processor.process(event).await
    }
}

/// Applies verified Stripe events to subscription state.
pub struct SubscriptionReconciler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    transactions: Arc<dyn TransactionRepository>,
    payments: Arc<dyn PaymentProvider>,
    gate: GroupGate,
    clock: Arc<dyn Clock>,
}

impl SubscriptionReconciler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        transactions: Arc<dyn TransactionRepository>,
        payments: Arc<dyn PaymentProvider>,
        gate: GroupGate,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscriptions,
            transactions,
            payments,
            gate,
            clock,
        }
    }

    async fn checkout_completed(&self, session: CheckoutSessionPayload) -> Result<(), WebhookError> {
        let mut transaction = self
            .transactions
            .find_by_session_id(&session.id)
            .await?
            .ok_or_else(|| {
                WebhookError::Ignored(format!("No transaction for checkout session {}", session.id))
            })?;

        let gateway_subscription_id = session
            .subscription
            .clone()
            .ok_or(WebhookError::MissingField("subscription"))?;
        let now = self.clock.now();

        // Redelivery after a partial failure: the row exists, finish the audit trail.
        if self
            .subscriptions
            .find_by_gateway_id(&gateway_subscription_id)
            .await?
            .is_some()
        {
            if !transaction.is_completed() {
                transaction.complete(Some(gateway_subscription_id.clone()), now);
                self.transactions.update(&transaction).await?;
            }
            return Err(WebhookError::Ignored(format!(
                "Subscription {} already recorded",
                gateway_subscription_id
            )));
        }

        let telegram_user_id = session
            .telegram_user_id()
            .map(TelegramUserId::new)
            .unwrap_or(transaction.telegram_user_id);

        let remote = self.fetch_subscription(&gateway_subscription_id).await?;
        let period = remote_period(&remote)?;

        let subscription = Subscription::activate_paid(
            transaction.user_id,
            telegram_user_id,
            GatewayRefs {
                subscription_id: Some(gateway_subscription_id.clone()),
                customer_id: session.customer.clone().or_else(|| remote.customer_id.clone()),
                product_id: remote.product_id.clone(),
                price_id: remote.price_id.clone(),
            },
            transaction.amount.clone(),
            period,
            now,
        );

        supersede_active(self.subscriptions.as_ref(), telegram_user_id, &subscription.id, now)
            .await?;
        self.subscriptions.save(&subscription).await?;

        transaction.complete(Some(gateway_subscription_id), now);
        self.transactions.update(&transaction).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            telegram_user_id = %telegram_user_id,
            period_end = %period.end,
            "Subscription activated"
        );

        self.gate
            .notify(
                telegram_user_id,
                messages::payment_succeeded(period.end, self.gate.invite_link()),
            )
            .await;
        Ok(())
    }

    async fn subscription_updated(&self, payload: SubscriptionPayload) -> Result<(), WebhookError> {
        let mut subscription = self.find_correlated(&payload.id).await?;
        let now = self.clock.now();

        let status = SubscriptionStatus::from_gateway(&payload.status);
        let period = payload
            .period_bounds()
            .map(|(start, end)| BillingPeriod::from_unix(start, end))
            .transpose()
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let was_active = subscription.is_active();
        if status == Some(SubscriptionStatus::Active) && !was_active {
            supersede_active(
                self.subscriptions.as_ref(),
                subscription.telegram_user_id,
                &subscription.id,
                now,
            )
            .await?;
        }

        subscription
            .sync_from_gateway(status, period, now)
            .map_err(|e| ignore_transition(&subscription, e))?;

        if let Some(price) = payload.first_price() {
            subscription.gateway.price_id = Some(price.id.clone());
            if price.product.is_some() {
                subscription.gateway.product_id = price.product.clone();
            }
        }

        self.subscriptions.update(&subscription).await?;
        tracing::info!(
            subscription_id = %subscription.id,
            gateway_status = %payload.status,
            status = %subscription.status,
            "Subscription synced from gateway"
        );

        // A later deletion finds the row already canceled, so access ends here.
        if was_active && !subscription.is_active() {
            self.gate
                .evict_and_notify(
                    subscription.telegram_user_id,
                    messages::subscription_canceled(),
                )
                .await;
        }
        Ok(())
    }

    async fn subscription_deleted(&self, payload: SubscriptionPayload) -> Result<(), WebhookError> {
        let mut subscription = self.find_correlated(&payload.id).await?;

        if subscription.status == SubscriptionStatus::Canceled {
            return Err(WebhookError::Ignored(format!(
                "Subscription {} already canceled",
                subscription.id
            )));
        }

        subscription
            .cancel(self.clock.now())
            .map_err(|e| ignore_transition(&subscription, e))?;
        self.subscriptions.update(&subscription).await?;

        tracing::info!(subscription_id = %subscription.id, "Subscription canceled");

        self.gate
            .evict_and_notify(
                subscription.telegram_user_id,
                messages::subscription_canceled(),
            )
            .await;
        Ok(())
    }

    async fn invoice_paid(&self, invoice: InvoicePayload) -> Result<(), WebhookError> {
        let gateway_subscription_id = invoice_subscription(&invoice)?;
        let mut subscription = self.find_correlated(&gateway_subscription_id).await?;
        let now = self.clock.now();

        let remote = self.fetch_subscription(&gateway_subscription_id).await?;
        let period = remote_period(&remote)?;
        let was_active = subscription.is_active();
        let advanced = subscription.period_end() != Some(period.end) || !was_active;

        if !was_active {
            supersede_active(
                self.subscriptions.as_ref(),
                subscription.telegram_user_id,
                &subscription.id,
                now,
            )
            .await?;
        }

        subscription
            .renew(period, now)
            .map_err(|e| ignore_transition(&subscription, e))?;
        self.subscriptions.update(&subscription).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            period_end = %period.end,
            "Subscription renewed"
        );

        // The first invoice of a new subscription carries the period checkout
        // already announced.
        // A lapsed member was evicted by the sweep and needs the link back in.
        if !was_active {
            self.gate
                .notify(
                    subscription.telegram_user_id,
                    messages::payment_succeeded(period.end, self.gate.invite_link()),
                )
                .await;
        } else if advanced {
            self.gate
                .notify(
                    subscription.telegram_user_id,
                    messages::subscription_renewed(period.end),
                )
                .await;
        }
        Ok(())
    }

    async fn invoice_failed(&self, invoice: InvoicePayload) -> Result<(), WebhookError> {
        let gateway_subscription_id = invoice_subscription(&invoice)?;
        let subscription = self.find_correlated(&gateway_subscription_id).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            invoice_id = %invoice.id,
            "Subscription payment failed"
        );

        self.gate
            .notify(subscription.telegram_user_id, messages::payment_failed())
            .await;
        Ok(())
    }

    async fn find_correlated(&self, gateway_subscription_id: &str) -> Result<Subscription, WebhookError> {
        self.subscriptions
            .find_by_gateway_id(gateway_subscription_id)
            .await?
            .ok_or_else(|| {
                WebhookError::Ignored(format!(
                    "No subscription for gateway id {}",
                    gateway_subscription_id
                ))
            })
    }

    async fn fetch_subscription(&self, id: &str) -> Result<GatewaySubscription, WebhookError> {
        self.payments
            .get_subscription(id)
            .await
            .map_err(gateway_error)?
            .ok_or_else(|| WebhookError::Ignored(format!("Gateway has no subscription {}", id)))
    }
}

#[async_trait]
impl WebhookDispatcher for SubscriptionReconciler {
    async fn dispatch(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        match event.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => {
                self.checkout_completed(object(event)?).await
            }
            StripeEventType::CustomerSubscriptionUpdated => {
                self.subscription_updated(object(event)?).await
            }
            StripeEventType::CustomerSubscriptionDeleted => {
                self.subscription_deleted(object(event)?).await
            }
            StripeEventType::InvoicePaymentSucceeded => self.invoice_paid(object(event)?).await,
            StripeEventType::InvoicePaymentFailed => self.invoice_failed(object(event)?).await,
            StripeEventType::Unknown => Err(WebhookError::Ignored(format!(
                "Unhandled event type {}",
                event.event_type
            ))),
        }
    }
}

fn object<T: DeserializeOwned>(event: &StripeEvent) -> Result<T, WebhookError> {
    event
        .deserialize_object()
        .map_err(|e| WebhookError::ParseError(format!("{} object: {}", event.event_type, e)))
}

fn invoice_subscription(invoice: &InvoicePayload) -> Result<String, WebhookError> {
    invoice.subscription_id().map(str::to_string).ok_or_else(|| {
        WebhookError::Ignored(format!("Invoice {} is not for a subscription", invoice.id))
    })
}

fn remote_period(remote: &GatewaySubscription) -> Result<BillingPeriod, WebhookError> {
    let start = remote
        .current_period_start
        .ok_or(WebhookError::MissingField("current_period_start"))?;
    let end = remote
        .current_period_end
        .ok_or(WebhookError::MissingField("current_period_end"))?;
    BillingPeriod::from_unix(start, end).map_err(|e| WebhookError::ParseError(e.to_string()))
}

fn gateway_error(err: PaymentError) -> WebhookError {
    WebhookError::Gateway(err.to_string())
}

fn ignore_transition(subscription: &Subscription, err: DomainError) -> WebhookError {
    if err.code == ErrorCode::InvalidStateTransition {
        tracing::warn!(
            subscription_id = %subscription.id,
            status = %subscription.status,
            error = %err,
            "Gateway event does not apply to current status"
        );
        WebhookError::Ignored(err.message)
    } else {
        WebhookError::from(err)
    }
}
