//! Mock messaging platform for testing.
//!
//! Records every outbound call so tests can assert on notifications and
//! evictions. Failures can be injected to exercise best-effort delivery.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::foundation::TelegramUserId;
use crate::ports::{MessagingError, MessagingPlatform, OutgoingMessage};

/// Message sent or edited through the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: i64,
    /// Set for edits of an earlier message.
    pub edited_message_id: Option<i64>,
    pub message: OutgoingMessage,
}

#[derive(Default, Clone)]
pub struct MockMessagingPlatform {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    sent: Vec<SentMessage>,
    evictions: Vec<(i64, TelegramUserId)>,
    answered_callbacks: Vec<String>,
    usernames: HashMap<TelegramUserId, String>,
    failing: bool,
    evictions_failing: bool,
    unreachable_chats: HashSet<i64>,
}

impl MockMessagingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every call fails with a network error while set.
    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Only `evict_member` fails while set.
    pub fn set_evictions_failing(&self, failing: bool) {
        self.state().evictions_failing = failing;
    }

    /// Messages to this chat fail, as when a user has blocked the bot.
    pub fn block_chat(&self, chat_id: i64) {
        self.state().unreachable_chats.insert(chat_id);
    }

    pub fn set_username(&self, user: TelegramUserId, username: &str) {
        self.state().usernames.insert(user, username.to_string());
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.state().sent.clone()
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<SentMessage> {
        self.state()
            .sent
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect()
    }

    pub fn evictions(&self) -> Vec<(i64, TelegramUserId)> {
        self.state().evictions.clone()
    }

    pub fn answered_callbacks(&self) -> Vec<String> {
        self.state().answered_callbacks.clone()
    }

    pub fn clear(&self) {
        let mut state = self.state();
        state.sent.clear();
        state.evictions.clear();
        state.answered_callbacks.clear();
    }

    fn check(&self, chat_id: Option<i64>) -> Result<(), MessagingError> {
        let state = self.state();
        if state.failing {
            return Err(MessagingError::Network("mock platform unavailable".to_string()));
        }
        if let Some(chat_id) = chat_id {
            if state.unreachable_chats.contains(&chat_id) {
                return Err(MessagingError::Rejected(
                    "Forbidden: bot was blocked by the user".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MessagingPlatform for MockMessagingPlatform {
    async fn send_message(
        &self,
        chat_id: i64,
        message: OutgoingMessage,
    ) -> Result<(), MessagingError> {
        self.check(Some(chat_id))?;
        self.state().sent.push(SentMessage {
            chat_id,
            edited_message_id: None,
            message,
        });
        Ok(())
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        message: OutgoingMessage,
    ) -> Result<(), MessagingError> {
        self.check(Some(chat_id))?;
        self.state().sent.push(SentMessage {
            chat_id,
            edited_message_id: Some(message_id),
            message,
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), MessagingError> {
        self.check(None)?;
        self.state().answered_callbacks.push(callback_id.to_string());
        Ok(())
    }

    async fn evict_member(
        &self,
        group_id: i64,
        user: TelegramUserId,
    ) -> Result<(), MessagingError> {
        self.check(None)?;
        if self.state().evictions_failing {
            return Err(MessagingError::Rejected(
                "Bad Request: not enough rights to ban".to_string(),
            ));
        }
        self.state().evictions.push((group_id, user));
        Ok(())
    }

    async fn lookup_username(
        &self,
        user: TelegramUserId,
    ) -> Result<Option<String>, MessagingError> {
        self.check(None)?;
        Ok(self.state().usernames.get(&user).cloned())
    }
}
