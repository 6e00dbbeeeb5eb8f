//! WebhookEventRepository port - processed Stripe event tracking.
//!
//! Stripe may deliver the same event more than once (timeouts, 5xx replies,
//! lost acknowledgements). Each delivery first claims the event id; only the
//! claimant applies the event. The claim is then completed with the outcome,
//! or released when a transient failure means Stripe should redeliver.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};

/// Processing state of a claimed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookOutcome {
    /// Claimed, not yet finished.
    Processing,
    Success,
    Ignored,
    Failed,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Processing => "processing",
            WebhookOutcome::Success => "success",
            WebhookOutcome::Ignored => "ignored",
            WebhookOutcome::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(WebhookOutcome::Processing),
            "success" => Some(WebhookOutcome::Success),
            "ignored" => Some(WebhookOutcome::Ignored),
            "failed" => Some(WebhookOutcome::Failed),
            _ => None,
        }
    }
}

/// Record of a claimed or processed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Stripe event ID (evt_xxx format).
    pub event_id: String,

    pub event_type: String,

    /// When the claim was taken or last completed.
    pub processed_at: Timestamp,

    pub result: WebhookOutcome,

    /// Ignore reason or failure message.
    pub error_message: Option<String>,

    /// Original event payload for debugging.
    pub payload: serde_json::Value,
}

impl WebhookEventRecord {
    /// A fresh claim for an event about to be applied.
    pub fn claim(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
        now: Timestamp,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: now,
            result: WebhookOutcome::Processing,
            error_message: None,
            payload,
        }
    }
}

/// Result of attempting to claim a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Claim taken (first delivery, or a stale claim was taken over).
    Inserted,
    /// Another delivery already holds or finished this event.
    AlreadyExists,
}

/// Claims older than this are assumed abandoned by a crashed worker.
pub const STALE_CLAIM_SECS: i64 = 600;

#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Atomically claim an event id.
    ///
    /// Inserts the record, or takes over an existing `Processing` claim
    /// older than [`STALE_CLAIM_SECS`]. Anything else is `AlreadyExists`.
    async fn try_claim(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;

    /// Record the final outcome of a claimed event.
    async fn complete(
        &self,
        event_id: &str,
        result: WebhookOutcome,
        error_message: Option<String>,
        now: Timestamp,
    ) -> Result<(), DomainError>;

    /// Drop a claim so a redelivery can process the event again.
    async fn release(&self, event_id: &str) -> Result<(), DomainError>;

    /// Delete records older than the specified timestamp.
    ///
    /// Returns the number of records deleted.
    async fn delete_before(&self, timestamp: Timestamp) -> Result<u64, DomainError>;
}

/// Result of webhook processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookResult {
    /// Event was applied.
    Processed,
    /// Event was acknowledged without changes.
    Ignored,
    /// Event was already processed (idempotent skip).
    AlreadyProcessed,
}
