//! Webhook processor - idempotent webhook event handling.
//!
//! ## Design
//!
//! 1. Claim the event id (first claimant wins via PRIMARY KEY)
//! 2. Dispatch to the handler for the event type
//! 3. Complete the claim with the outcome, or release it on a retryable
//!    failure so Stripe's redelivery is processed from scratch
//!
//! Concurrent deliveries of one event race on the claim; losers return
//! `AlreadyProcessed` without touching any other state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::{
    Clock, SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome, WebhookResult,
};

use super::{StripeEvent, WebhookError};

/// Applies a verified event to the subscription state.
///
/// Returns `Err(WebhookError::Ignored(_))` for events that should be
/// acknowledged without changes.
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    async fn dispatch(&self, event: &StripeEvent) -> Result<(), WebhookError>;
}

/// Processes webhook events with idempotency guarantees.
pub struct IdempotentWebhookProcessor<D: WebhookDispatcher> {
    repository: Arc<dyn WebhookEventRepository>,
    dispatcher: D,
    clock: Arc<dyn Clock>,
}

impl<D: WebhookDispatcher> IdempotentWebhookProcessor<D> {
    pub fn new(
        repository: Arc<dyn WebhookEventRepository>,
        dispatcher: D,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            clock,
        }
    }

    /// Process a webhook event at most once.
    ///
    /// # Returns
    ///
    /// - `Ok(Processed)` - event applied
    /// - `Ok(Ignored)` - event acknowledged without changes
    /// - `Ok(AlreadyProcessed)` - another delivery holds or finished the claim
    /// - `Err(_)` - processing failed; retryable errors released the claim
    pub async fn process(&self, event: StripeEvent) -> Result<WebhookResult, WebhookError> {
        let payload = serde_json::to_value(&event)
            .map_err(|e| WebhookError::ParseError(format!("Failed to serialize event: {}", e)))?;
        let claim =
            WebhookEventRecord::claim(&event.id, &event.event_type, payload, self.clock.now());

        if self.repository.try_claim(claim).await? == SaveResult::AlreadyExists {
            tracing::info!(event_id = %event.id, "Duplicate webhook delivery skipped");
            return Ok(WebhookResult::AlreadyProcessed);
        }

        match self.dispatcher.dispatch(&event).await {
            Ok(()) => {
                self.finish(&event.id, WebhookOutcome::Success, None).await?;
                Ok(WebhookResult::Processed)
            }
            Err(WebhookError::Ignored(reason)) => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    reason = %reason,
                    "Webhook event ignored"
                );
                self.finish(&event.id, WebhookOutcome::Ignored, Some(reason))
                    .await?;
                Ok(WebhookResult::Ignored)
            }
            Err(err) if err.is_retryable() => {
                if let Err(release_err) = self.repository.release(&event.id).await {
                    tracing::error!(
                        event_id = %event.id,
                        error = %release_err,
                        "Failed to release webhook claim"
                    );
                }
                Err(err)
            }
            Err(err) => {
                self.finish(&event.id, WebhookOutcome::Failed, Some(err.to_string()))
                    .await?;
                Err(err)
            }
        }
    }

    async fn finish(
        &self,
        event_id: &str,
        outcome: WebhookOutcome,
        message: Option<String>,
    ) -> Result<(), WebhookError> {
        self.repository
            .complete(event_id, outcome, message, self.clock.now())
            .await
            .map_err(WebhookError::from)
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}
