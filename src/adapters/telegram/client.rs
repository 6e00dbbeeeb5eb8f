//! Telegram Bot API client.
//!
//! Implements `MessagingPlatform` over the HTTPS Bot API with JSON bodies.
//! Also exposes `get_updates` for the long-polling loop.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::config::TelegramConfig;
use crate::domain::foundation::TelegramUserId;
use crate::ports::{MessagingError, MessagingPlatform, OutgoingMessage};

use super::types::{ApiResponse, Chat, InlineKeyboardMarkup, Update};

/// Extra time on top of the long-poll timeout before the HTTP call gives up.
const POLL_GRACE_SECS: u64 = 10;

#[derive(Clone)]
pub struct TelegramBotClient {
    token: Secret<String>,
    api_base_url: String,
    http_client: reqwest::Client,
}

impl TelegramBotClient {
    pub fn new(token: Secret<String>, api_base_url: impl Into<String>) -> Self {
        Self {
            token,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &TelegramConfig) -> Self {
        Self::new(config.bot_token.clone(), config.api_base_url.clone())
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base_url,
            self.token.expose_secret(),
            method
        )
    }

    async fn call<B, T>(
        &self,
        method: &'static str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, MessagingError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http_client.post(self.method_url(method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // The URL embeds the token; keep reqwest's error text out of logs.
        let response = request
            .send()
            .await
            .map_err(|e| MessagingError::Network(format!("{} failed: {}", method, e.without_url())))?;

        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            MessagingError::InvalidResponse(format!("{}: {}", method, e.without_url()))
        })?;

        if !envelope.ok {
            return Err(MessagingError::Rejected(format!(
                "{} ({}): {}",
                method,
                envelope.error_code.unwrap_or_default(),
                envelope.description.unwrap_or_default()
            )));
        }

        envelope
            .result
            .ok_or_else(|| MessagingError::InvalidResponse(format!("{}: missing result", method)))
    }

    /// Long-polls for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, MessagingError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
            Some(Duration::from_secs(timeout_secs + POLL_GRACE_SECS)),
        )
        .await
    }
}

fn message_body(chat_id: i64, message: &OutgoingMessage) -> serde_json::Value {
    let mut body = json!({
        "chat_id": chat_id,
        "text": message.text,
        "disable_web_page_preview": true,
    });
    if let Some(markup) = InlineKeyboardMarkup::from_buttons(&message.buttons) {
        body["reply_markup"] = json!(markup);
    }
    body
}

#[async_trait]
impl MessagingPlatform for TelegramBotClient {
    async fn send_message(
        &self,
        chat_id: i64,
        message: OutgoingMessage,
    ) -> Result<(), MessagingError> {
        let _: serde_json::Value = self
            .call("sendMessage", &message_body(chat_id, &message), None)
            .await?;
        Ok(())
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        message: OutgoingMessage,
    ) -> Result<(), MessagingError> {
        let mut body = message_body(chat_id, &message);
        body["message_id"] = json!(message_id);
        let _: serde_json::Value = self.call("editMessageText", &body, None).await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), MessagingError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": callback_id }),
                None,
            )
            .await?;
        Ok(())
    }

    async fn evict_member(
        &self,
        group_id: i64,
        user: TelegramUserId,
    ) -> Result<(), MessagingError> {
        let _: bool = self
            .call(
                "banChatMember",
                &json!({ "chat_id": group_id, "user_id": user.as_i64() }),
                None,
            )
            .await?;

        // Lift the ban right away so the user can rejoin after paying again.
        let _: bool = self
            .call(
                "unbanChatMember",
                &json!({
                    "chat_id": group_id,
                    "user_id": user.as_i64(),
                    "only_if_banned": true,
                }),
                None,
            )
            .await?;
        Ok(())
    }

    async fn lookup_username(
        &self,
        user: TelegramUserId,
    ) -> Result<Option<String>, MessagingError> {
        let chat: Chat = self
            .call("getChat", &json!({ "chat_id": user.as_i64() }), None)
            .await?;
        Ok(chat.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{ButtonAction, InlineButton};

    #[test]
    fn method_url_embeds_token() {
        let client = TelegramBotClient::new(
            Secret::new("123:ABC".to_string()),
            "https://api.telegram.org/",
        );
        assert_eq!(
            client.method_url("sendMessage"),
            "https://api.telegram.org/bot123:ABC/sendMessage"
        );
    }

    #[test]
    fn plain_message_has_no_markup() {
        let body = message_body(5, &OutgoingMessage::text("hi"));
        assert_eq!(body["chat_id"], 5);
        assert_eq!(body["text"], "hi");
        assert!(body.get("reply_markup").is_none());
    }

    #[test]
    fn buttons_become_inline_keyboard() {
        let message = OutgoingMessage::text("pick").with_buttons(vec![InlineButton {
            text: "Pay".to_string(),
            action: ButtonAction::Subscribe,
        }]);
        let body = message_body(5, &message);
        assert_eq!(
            body["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "subscribe"
        );
    }

    #[test]
    fn rejected_envelope_deserializes_without_result() {
        let envelope: ApiResponse<bool> = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        )
        .unwrap();
        assert!(!envelope.ok);
        assert!(envelope.result.is_none());
        assert_eq!(envelope.error_code, Some(400));
    }
}
