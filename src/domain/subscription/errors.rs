//! Subscription-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | UserNotFound | 404 |
//! | AlreadyActive | 409 |
//! | PaymentFailed | 502 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Precondition and dependency failures of subscription operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The chat user never started the bot, so no profile exists.
    UserNotFound(String),

    /// The user already holds an active subscription.
    AlreadyActive(String),

    /// The payment gateway refused or failed a call.
    PaymentFailed { reason: String },

    ValidationFailed { field: String, message: String },

    Infrastructure(String),
}

impl SubscriptionError {
    pub fn user_not_found(who: impl Into<String>) -> Self {
        SubscriptionError::UserNotFound(who.into())
    }

    pub fn already_active(who: impl Into<String>) -> Self {
        SubscriptionError::AlreadyActive(who.into())
    }

    pub fn payment_failed(reason: impl Into<String>) -> Self {
        SubscriptionError::PaymentFailed {
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::UserNotFound(_) => ErrorCode::UserNotFound,
            SubscriptionError::AlreadyActive(_) => ErrorCode::SubscriptionAlreadyActive,
            SubscriptionError::PaymentFailed { .. } => ErrorCode::ExternalServiceError,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Message safe to show to the caller.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::UserNotFound(_) => {
                "User not found. User must start the bot first.".to_string()
            }
            SubscriptionError::AlreadyActive(_) => {
                "User already has an active subscription.".to_string()
            }
            SubscriptionError::PaymentFailed { reason } => reason.clone(),
            SubscriptionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SubscriptionError::Infrastructure(_) => "Internal server error".to_string(),
        }
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionError::Infrastructure(detail) => write!(f, "Infrastructure: {}", detail),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for SubscriptionError {}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => SubscriptionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::UserNotFound => SubscriptionError::UserNotFound(err.message),
            ErrorCode::SubscriptionAlreadyActive => SubscriptionError::AlreadyActive(err.message),
            ErrorCode::ExternalServiceError | ErrorCode::PaymentRequired => {
                SubscriptionError::PaymentFailed {
                    reason: err.message,
                }
            }
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
