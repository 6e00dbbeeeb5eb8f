//! Chat user profile.
//!
//! Created the first time someone talks to the bot; never deleted. The email
//! is the only attribute changed afterwards (through manual grants).

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{TelegramUserId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub telegram_user_id: TelegramUserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Set from the admin allow-list at creation time.
    pub is_admin: bool,
    pub created_at: Timestamp,
}

impl User {
    pub fn register(
        telegram_user_id: TelegramUserId,
        username: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
        is_admin: bool,
        now: Timestamp,
    ) -> Self {
        Self {
            id: UserId::new(),
            telegram_user_id,
            username: username.filter(|u| !u.is_empty()),
            first_name,
            last_name,
            email: None,
            is_admin,
            created_at: now,
        }
    }

    /// `@username`, or `ID<id>` for users without one.
    pub fn display_name(&self) -> String {
        display_name(self.username.as_deref(), self.telegram_user_id)
    }
}

pub fn display_name(username: Option<&str>, telegram_user_id: TelegramUserId) -> String {
    match username {
        Some(name) if !name.is_empty() => format!("@{}", name),
        _ => format!("ID{}", telegram_user_id),
    }
}
