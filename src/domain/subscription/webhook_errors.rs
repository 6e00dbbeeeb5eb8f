//! Errors raised while authenticating or applying a Stripe webhook.
//!
//! The status code decides whether Stripe redelivers: 2xx acknowledges,
//! 4xx rejects permanently, 5xx asks for a retry.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature did not match the payload.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed more than five minutes ago.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signed in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Header or JSON payload could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Nothing to apply: no correlated record, unknown type, or a transition
    /// the current record cannot take. Acknowledged so Stripe stops retrying.
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// Stripe API call made while applying the event failed.
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if Stripe should redeliver this event.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Gateway(_) | WebhookError::Database(_))
    }

    /// Rejections happen before any state is touched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
                | WebhookError::ParseError(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MissingMetadata(_)
            | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            WebhookError::Ignored(_) => StatusCode::OK,

            WebhookError::Gateway(_) | WebhookError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Display
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_error_displays_message() {
        let err = WebhookError::ParseError("invalid JSON".to_string());
        assert_eq!(err.to_string(), "Parse error: invalid JSON");
    }

    #[test]
    fn missing_metadata_displays_field_name() {
        let err = WebhookError::MissingMetadata("telegram_user_id");
        assert_eq!(err.to_string(), "Missing metadata: telegram_user_id");
    }

    #[test]
    fn ignored_displays_reason() {
        let err = WebhookError::Ignored("no transaction for session".to_string());
        assert_eq!(err.to_string(), "Event ignored: no transaction for session");
    }

    // ══════════════════════════════════════════════════════════════
    // Retryability
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn infrastructure_errors_are_retryable() {
        assert!(WebhookError::Database("connection lost".to_string()).is_retryable());
        assert!(WebhookError::Gateway("timeout".to_string()).is_retryable());
    }

    #[test]
    fn authentication_errors_are_not_retryable() {
        assert!(!WebhookError::InvalidSignature.is_retryable());
        assert!(!WebhookError::TimestampOutOfRange.is_retryable());
        assert!(!WebhookError::ParseError("bad".to_string()).is_retryable());
    }

    #[test]
    fn ignored_is_not_retryable() {
        assert!(!WebhookError::Ignored("unknown type".to_string()).is_retryable());
    }

    // ══════════════════════════════════════════════════════════════
    // Status Codes
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn authentication_failures_return_bad_request() {
        for err in [
            WebhookError::InvalidSignature,
            WebhookError::TimestampOutOfRange,
            WebhookError::InvalidTimestamp,
            WebhookError::ParseError("x".to_string()),
        ] {
            assert!(err.is_rejection());
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn missing_field_returns_bad_request() {
        let err = WebhookError::MissingField("subscription");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_rejection());
    }

    #[test]
    fn ignored_returns_ok() {
        let err = WebhookError::Ignored("not relevant".to_string());
        assert_eq!(err.status_code(), StatusCode::OK);
    }

    #[test]
    fn database_error_returns_internal_error() {
        let err = WebhookError::Database("connection lost".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
