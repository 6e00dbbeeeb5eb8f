//! Chat bot update handling.

mod handle_bot_update;

pub use handle_bot_update::BotUpdateHandler;
