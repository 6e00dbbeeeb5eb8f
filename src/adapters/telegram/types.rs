//! Telegram Bot API wire types.
//!
//! Only the fields the bot reads or writes are modelled.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::TelegramUserId;
use crate::ports::{BotUpdate, ButtonAction, ChatProfile, InlineButton};

/// Envelope wrapping every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TelegramUser,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardMarkup {
    /// One button per row.
    pub fn from_buttons(buttons: &[InlineButton]) -> Option<Self> {
        if buttons.is_empty() {
            return None;
        }
        Some(Self {
            inline_keyboard: buttons
                .iter()
                .map(|b| {
                    vec![InlineKeyboardButton {
                        text: b.text.clone(),
                        callback_data: b.action.callback_data().to_string(),
                    }]
                })
                .collect(),
        })
    }
}

impl From<TelegramUser> for ChatProfile {
    fn from(user: TelegramUser) -> Self {
        ChatProfile {
            id: TelegramUserId::new(user.id),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Extracts `start` from `/start`, `/start@my_bot` or `/start payload`.
pub fn parse_command(text: &str) -> Option<String> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);
    if name.is_empty() {
        None
    } else {
        Some(name.to_lowercase())
    }
}

impl Update {
    /// The interaction this update carries, if the bot reacts to it.
    pub fn into_bot_update(self) -> Option<BotUpdate> {
        if let Some(query) = self.callback_query {
            let message = query.message?;
            return Some(BotUpdate::Button {
                callback_id: query.id,
                chat_id: message.chat.id,
                message_id: message.message_id,
                from: query.from.into(),
                action: ButtonAction::from_callback_data(query.data.as_deref().unwrap_or("")),
            });
        }

        let message = self.message?;
        let command = parse_command(message.text.as_deref()?)?;
        Some(BotUpdate::Command {
            chat_id: message.chat.id,
            from: message.from?.into(),
            command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_parses_without_result() {
        let envelope: ApiResponse<Chat> = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        )
        .unwrap();
        assert!(!envelope.ok);
        assert!(envelope.result.is_none());
        assert_eq!(envelope.error_code, Some(400));
    }

    #[test]
    fn success_envelope_carries_result() {
        let envelope: ApiResponse<Chat> =
            serde_json::from_str(r#"{"ok":true,"result":{"id":-100,"username":"gate"}}"#).unwrap();
        assert_eq!(envelope.result.map(|c| c.id), Some(-100));
    }

    #[test]
    fn parse_command_strips_bot_suffix_and_arguments() {
        assert_eq!(parse_command("/start"), Some("start".to_string()));
        assert_eq!(parse_command("/Start@gate_bot"), Some("start".to_string()));
        assert_eq!(parse_command("/admin now"), Some("admin".to_string()));
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("/"), None);
    }

    #[test]
    fn command_message_becomes_command_update() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 10,
            "message": {
                "message_id": 5,
                "chat": {"id": 777, "type": "private"},
                "from": {"id": 777, "is_bot": false, "first_name": "Ann", "username": "ann"},
                "text": "/start"
            }
        }))
        .unwrap();

        match update.into_bot_update() {
            Some(BotUpdate::Command {
                chat_id,
                from,
                command,
            }) => {
                assert_eq!(chat_id, 777);
                assert_eq!(from.username.as_deref(), Some("ann"));
                assert_eq!(command, "start");
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[test]
    fn callback_query_becomes_button_update() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 11,
            "callback_query": {
                "id": "cb1",
                "from": {"id": 777, "is_bot": false, "first_name": "Ann"},
                "message": {"message_id": 9, "chat": {"id": 777, "type": "private"}},
                "data": "subscribe"
            }
        }))
        .unwrap();

        match update.into_bot_update() {
            Some(BotUpdate::Button {
                callback_id,
                message_id,
                action,
                ..
            }) => {
                assert_eq!(callback_id, "cb1");
                assert_eq!(message_id, 9);
                assert_eq!(action, ButtonAction::Subscribe);
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[test]
    fn plain_text_is_not_an_interaction() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 12,
            "message": {
                "message_id": 5,
                "chat": {"id": 1, "type": "private"},
                "from": {"id": 1, "is_bot": false, "first_name": "A"},
                "text": "hi"
            }
        }))
        .unwrap();
        assert!(update.into_bot_update().is_none());
    }

    #[test]
    fn keyboard_is_one_button_per_row() {
        let markup = InlineKeyboardMarkup::from_buttons(&[
            InlineButton {
                text: "a".to_string(),
                action: ButtonAction::Subscribe,
            },
            InlineButton {
                text: "b".to_string(),
                action: ButtonAction::Status,
            },
        ])
        .unwrap();
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[1][0].callback_data, "status");
        assert!(InlineKeyboardMarkup::from_buttons(&[]).is_none());
    }
}
