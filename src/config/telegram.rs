//! Telegram bot configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::TelegramUserId;

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token from BotFather
    pub bot_token: Secret<String>,

    /// Private group the subscription unlocks
    pub group_id: i64,

    /// Invite link sent to users on activation
    #[serde(default)]
    pub group_invite_link: String,

    /// Chat ids allowed to run `/admin` (comma-separated)
    #[serde(default)]
    pub admin_user_ids: String,

    /// Bot API base URL, overridable for local stubs
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Long-poll timeout for `getUpdates`, in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Run the update poller in this process
    #[serde(default = "default_polling_enabled")]
    pub polling_enabled: bool,
}

impl TelegramConfig {
    /// Parsed admin allow-list.
    pub fn admin_ids(&self) -> Result<Vec<TelegramUserId>, ValidationError> {
        self.admin_user_ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .map_err(|_| ValidationError::InvalidAdminUserId(s.to_string()))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bot_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("TELEGRAM__BOT_TOKEN"));
        }
        if self.group_invite_link.is_empty() {
            return Err(ValidationError::MissingRequired("TELEGRAM__GROUP_INVITE_LINK"));
        }
        if !self.group_invite_link.starts_with("https://") {
            return Err(ValidationError::InvalidInviteLink);
        }
        if self.admin_ids()?.is_empty() {
            return Err(ValidationError::MissingRequired("TELEGRAM__ADMIN_USER_IDS"));
        }
        if self.poll_timeout_secs == 0 {
            return Err(ValidationError::InvalidInterval("poll_timeout_secs"));
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_polling_enabled() -> bool {
    true
}
