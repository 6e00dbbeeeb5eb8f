//! CreateCheckoutSessionHandler - hands a chat user a Stripe checkout link.

use std::sync::Arc;

use crate::domain::foundation::TelegramUserId;
use crate::domain::subscription::{PaymentTransaction, SubscriptionError, SubscriptionPlan};
use crate::ports::{
    Clock, CreateCheckoutRequest, CreateCustomerRequest, PaymentProvider, TransactionRepository,
    UserRepository,
};

#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionCommand {
    pub telegram_user_id: TelegramUserId,
}

#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionResult {
    pub session_id: String,
    pub checkout_url: String,
}

pub struct CreateCheckoutSessionHandler {
    users: Arc<dyn UserRepository>,
    transactions: Arc<dyn TransactionRepository>,
    payments: Arc<dyn PaymentProvider>,
    plan: SubscriptionPlan,
    price_id: String,
    base_url: String,
    clock: Arc<dyn Clock>,
}

impl CreateCheckoutSessionHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        transactions: Arc<dyn TransactionRepository>,
        payments: Arc<dyn PaymentProvider>,
        plan: SubscriptionPlan,
        price_id: impl Into<String>,
        base_url: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            transactions,
            payments,
            plan,
            price_id: price_id.into(),
            base_url: base_url.into(),
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, SubscriptionError> {
        // 1. The user must have started the bot
        let user = self
            .users
            .find_by_telegram_id(cmd.telegram_user_id)
            .await?
            .ok_or_else(|| SubscriptionError::user_not_found(cmd.telegram_user_id.to_string()))?;

        // 2. Gateway customer carrying the chat identity
        let customer = self
            .payments
            .create_customer(CreateCustomerRequest {
                telegram_user_id: user.telegram_user_id,
                username: user.username.clone(),
                email: user.email.clone(),
            })
            .await
            .map_err(|e| SubscriptionError::payment_failed(e.message))?;

        // 3. Hosted checkout for the recurring price
        let session = self
            .payments
            .create_checkout_session(CreateCheckoutRequest {
                customer_id: customer.id,
                price_id: self.price_id.clone(),
                telegram_user_id: user.telegram_user_id,
                user_id: user.id,
                success_url: format!("{}/success?session_id={{CHECKOUT_SESSION_ID}}", self.base_url),
                cancel_url: format!("{}/cancel", self.base_url),
            })
            .await
            .map_err(|e| SubscriptionError::payment_failed(e.message))?;

        // 4. Audit record the webhook correlates against
        let transaction = PaymentTransaction::initiate(
            user.id,
            user.telegram_user_id,
            session.id.clone(),
            self.plan.price.clone(),
            self.clock.now(),
        );
        self.transactions.save(&transaction).await?;

        tracing::info!(
            telegram_user_id = %user.telegram_user_id,
            session_id = %session.id,
            "Checkout session created"
        );

        Ok(CreateCheckoutSessionResult {
            session_id: session.id,
            checkout_url: session.url,
        })
    }
}
