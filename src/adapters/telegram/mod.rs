//! Telegram Bot API adapter.
//!
//! - `client` - `MessagingPlatform` over the HTTPS Bot API
//! - `poller` - `getUpdates` long-polling loop driving the bot handler
//! - `mock_messaging_platform` - recording mock for tests

mod client;
mod mock_messaging_platform;
mod poller;
mod types;

pub use client::TelegramBotClient;
pub use mock_messaging_platform::{MockMessagingPlatform, SentMessage};
pub use poller::{UpdatePoller, UpdatePollerConfig};
pub use types::{parse_command, Update};
