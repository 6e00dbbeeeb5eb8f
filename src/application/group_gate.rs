//! Side effects on the private group and the user's chat.
//!
//! Every call is best effort: failures are logged at `warn` and swallowed so
//! a committed subscription change is never rolled back by a delivery
//! problem.

use std::sync::Arc;

use crate::domain::foundation::TelegramUserId;
use crate::domain::subscription::GroupAccess;
use crate::ports::{MessagingPlatform, OutgoingMessage};

#[derive(Clone)]
pub struct GroupGate {
    messaging: Arc<dyn MessagingPlatform>,
    group: GroupAccess,
}

impl GroupGate {
    pub fn new(messaging: Arc<dyn MessagingPlatform>, group: GroupAccess) -> Self {
        Self { messaging, group }
    }

    pub fn invite_link(&self) -> &str {
        &self.group.invite_link
    }

    /// Sends a direct message. Returns whether it was delivered.
    pub async fn notify(&self, user: TelegramUserId, message: OutgoingMessage) -> bool {
        match self.messaging.send_message(user.as_i64(), message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    telegram_user_id = %user,
                    error = %e,
                    "Failed to notify user"
                );
                false
            }
        }
    }

    /// Removes the user from the group, then tells them why.
    ///
    /// The notification is sent even when the eviction fails.
    pub async fn evict_and_notify(&self, user: TelegramUserId, message: OutgoingMessage) {
        if let Err(e) = self.messaging.evict_member(self.group.group_id, user).await {
            tracing::warn!(
                telegram_user_id = %user,
                group_id = self.group.group_id,
                error = %e,
                "Failed to remove user from group"
            );
        }
        self.notify(user, message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::telegram::MockMessagingPlatform;

    fn gate(mock: &MockMessagingPlatform) -> GroupGate {
        GroupGate::new(
            Arc::new(mock.clone()),
            GroupAccess {
                group_id: -100,
                invite_link: "https://t.me/+abc".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn notify_failure_is_swallowed() {
        let mock = MockMessagingPlatform::new();
        mock.set_failing(true);

        assert!(!gate(&mock).notify(TelegramUserId::new(1), OutgoingMessage::text("x")).await);
    }

    #[tokio::test]
    async fn eviction_failure_still_notifies() {
        let mock = MockMessagingPlatform::new();
        mock.set_evictions_failing(true);

        gate(&mock)
            .evict_and_notify(TelegramUserId::new(1), OutgoingMessage::text("bye"))
            .await;

        assert!(mock.evictions().is_empty());
        assert_eq!(mock.sent_to(1).len(), 1);
    }

    #[tokio::test]
    async fn evicts_from_configured_group() {
        let mock = MockMessagingPlatform::new();

        gate(&mock)
            .evict_and_notify(TelegramUserId::new(1), OutgoingMessage::text("bye"))
            .await;

        assert_eq!(mock.evictions(), vec![(-100, TelegramUserId::new(1))]);
    }
}
