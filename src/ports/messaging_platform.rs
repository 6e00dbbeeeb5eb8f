//! Messaging platform port.
//!
//! The bot's outbound surface: direct messages, inline keyboards, callback
//! acknowledgement, and group membership control. Inbound updates are
//! described by [`BotUpdate`] and produced by whichever adapter receives them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, TelegramUserId};

#[async_trait]
pub trait MessagingPlatform: Send + Sync {
    /// Sends a message to a private chat.
    async fn send_message(
        &self,
        chat_id: i64,
        message: OutgoingMessage,
    ) -> Result<(), MessagingError>;

    /// Replaces the text and keyboard of a message the bot sent earlier.
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        message: OutgoingMessage,
    ) -> Result<(), MessagingError>;

    /// Acknowledges a button press so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<(), MessagingError>;

    /// Removes a member from the group while still allowing a later rejoin.
    async fn evict_member(&self, group_id: i64, user: TelegramUserId)
        -> Result<(), MessagingError>;

    /// Current username for a user, if they have one.
    async fn lookup_username(&self, user: TelegramUserId)
        -> Result<Option<String>, MessagingError>;
}

/// Sender of an inbound update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatProfile {
    pub id: TelegramUserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Inline keyboard actions the bot offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    Subscribe,
    Status,
    Other(String),
}

impl ButtonAction {
    pub fn from_callback_data(data: &str) -> Self {
        match data {
            "subscribe" => ButtonAction::Subscribe,
            "status" => ButtonAction::Status,
            other => ButtonAction::Other(other.to_string()),
        }
    }

    pub fn callback_data(&self) -> &str {
        match self {
            ButtonAction::Subscribe => "subscribe",
            ButtonAction::Status => "status",
            ButtonAction::Other(data) => data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub action: ButtonAction,
}

/// Message text with an optional one-button-per-row inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub buttons: Vec<InlineButton>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<InlineButton>) -> Self {
        self.buttons = buttons;
        self
    }
}

/// Inbound interaction the bot reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotUpdate {
    /// A `/command` typed in a private chat. `command` has no leading slash.
    Command {
        chat_id: i64,
        from: ChatProfile,
        command: String,
    },
    /// An inline keyboard button press on a message the bot sent.
    Button {
        callback_id: String,
        chat_id: i64,
        message_id: i64,
        from: ChatProfile,
        action: ButtonAction,
    },
}

#[derive(Debug, Clone, Error)]
pub enum MessagingError {
    #[error("Messaging platform unreachable: {0}")]
    Network(String),

    #[error("Messaging platform rejected request: {0}")]
    Rejected(String),

    #[error("Unexpected messaging platform response: {0}")]
    InvalidResponse(String),
}

impl From<MessagingError> for DomainError {
    fn from(err: MessagingError) -> Self {
        DomainError::new(ErrorCode::ExternalServiceError, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messaging_platform_is_object_safe() {
        fn _accepts_dyn(_platform: &dyn MessagingPlatform) {}
    }

    #[test]
    fn button_actions_round_trip_callback_data() {
        for action in [ButtonAction::Subscribe, ButtonAction::Status] {
            assert_eq!(ButtonAction::from_callback_data(action.callback_data()), action);
        }
        assert_eq!(
            ButtonAction::from_callback_data("x"),
            ButtonAction::Other("x".to_string())
        );
    }
}
