//! GrantSubscriptionHandler - admin-issued subscription without payment.

use std::sync::Arc;

use crate::application::group_gate::GroupGate;
use crate::application::messages;
use crate::domain::subscription::{
    BillingPeriod, Subscription, SubscriptionError, SubscriptionPlan,
};
use crate::domain::user::User;
use crate::ports::{Clock, SubscriptionRepository, UserRepository};

pub const DEFAULT_GRANT_DAYS: i64 = 30;

/// Upper bound on a manual grant, ten years.
pub const MAX_GRANT_DAYS: i64 = 3_650;

#[derive(Debug, Clone)]
pub struct GrantSubscriptionCommand {
    /// With or without the leading `@`.
    pub telegram_username: String,
    pub email: Option<String>,
    pub duration_days: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct GrantSubscriptionResult {
    pub subscription: Subscription,
    pub user: User,
}

pub struct GrantSubscriptionHandler {
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    gate: GroupGate,
    plan: SubscriptionPlan,
    clock: Arc<dyn Clock>,
}

impl GrantSubscriptionHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        gate: GroupGate,
        plan: SubscriptionPlan,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            subscriptions,
            gate,
            plan,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: GrantSubscriptionCommand,
    ) -> Result<GrantSubscriptionResult, SubscriptionError> {
        let username = cmd.telegram_username.trim().trim_start_matches('@');
        if username.is_empty() {
            return Err(SubscriptionError::validation(
                "telegram_username",
                "must not be empty",
            ));
        }
        let days = cmd.duration_days.unwrap_or(DEFAULT_GRANT_DAYS);
        if days <= 0 {
            return Err(SubscriptionError::validation(
                "duration_days",
                "must be a positive number of days",
            ));
        }
        if days > MAX_GRANT_DAYS {
            return Err(SubscriptionError::validation(
                "duration_days",
                format!("must not exceed {} days", MAX_GRANT_DAYS),
            ));
        }

        let mut user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| SubscriptionError::user_not_found(username))?;

        if !self
            .subscriptions
            .find_active_by_telegram_user(user.telegram_user_id)
            .await?
            .is_empty()
        {
            return Err(SubscriptionError::already_active(username));
        }

        let now = self.clock.now();
        let period = BillingPeriod::starting_at(now, days)?;
        let subscription = Subscription::grant_manual(
            user.id,
            user.telegram_user_id,
            self.plan.price.clone(),
            period,
            now,
        );
        // A concurrent grant or checkout surfaces here as AlreadyActive.
        self.subscriptions.save(&subscription).await?;

        if let Some(email) = cmd.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            self.users.update_email(&user.id, email).await?;
            user.email = Some(email.to_string());
        }

        tracing::info!(
            subscription_id = %subscription.id,
            telegram_user_id = %user.telegram_user_id,
            duration_days = days,
            "Subscription granted manually"
        );

        self.gate
            .notify(
                user.telegram_user_id,
                messages::subscription_granted(period.end, self.gate.invite_link()),
            )
            .await;

        Ok(GrantSubscriptionResult { subscription, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemorySubscriptionRepository, InMemoryUserRepository, ManualClock};
    use crate::adapters::telegram::MockMessagingPlatform;
    use crate::domain::foundation::{TelegramUserId, Timestamp};
    use crate::domain::subscription::{GroupAccess, Money};

    const T0: i64 = 1_704_067_200;

    struct Fixture {
        handler: GrantSubscriptionHandler,
        users: Arc<InMemoryUserRepository>,
        subscriptions: Arc<InMemorySubscriptionRepository>,
        messaging: MockMessagingPlatform,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let messaging = MockMessagingPlatform::new();
        let handler = GrantSubscriptionHandler::new(
            users.clone(),
            subscriptions.clone(),
            GroupGate::new(
                Arc::new(messaging.clone()),
                GroupAccess {
                    group_id: -100,
                    invite_link: "https://t.me/+abc".to_string(),
                },
            ),
            SubscriptionPlan {
                price: Money::new(10_000, "UAH"),
                period_days: 30,
            },
            Arc::new(ManualClock::new(Timestamp::from_unix_secs(T0).unwrap())),
        );
        Fixture {
            handler,
            users,
            subscriptions,
            messaging,
        }
    }

    async fn register(f: &Fixture, tg: i64, username: &str) {
        let user = User::register(
            TelegramUserId::new(tg),
            Some(username.to_string()),
            None,
            None,
            false,
            Timestamp::from_unix_secs(T0).unwrap(),
        );
        f.users.insert_if_absent(&user).await.unwrap();
    }

    fn grant(username: &str, days: Option<i64>) -> GrantSubscriptionCommand {
        GrantSubscriptionCommand {
            telegram_username: username.to_string(),
            email: Some("ann@example.com".to_string()),
            duration_days: days,
        }
    }

    #[tokio::test]
    async fn grants_period_and_notifies() {
        let f = fixture();
        register(&f, 7, "ann").await;

        let result = f.handler.handle(grant("@ann", Some(14))).await.unwrap();

        let period = result.subscription.period.unwrap();
        assert_eq!(period.start.as_unix_secs(), T0);
        assert_eq!(period.end.as_unix_secs(), T0 + 14 * 86_400);
        assert!(result.subscription.gateway.subscription_id.is_none());
        assert_eq!(result.user.email.as_deref(), Some("ann@example.com"));
        assert_eq!(f.messaging.sent_to(7).len(), 1);
    }

    #[tokio::test]
    async fn defaults_to_thirty_days() {
        let f = fixture();
        register(&f, 7, "ann").await;

        let result = f.handler.handle(grant("ann", None)).await.unwrap();

        assert_eq!(
            result.subscription.period_end().unwrap().as_unix_secs(),
            T0 + DEFAULT_GRANT_DAYS * 86_400
        );
    }

    #[tokio::test]
    async fn unknown_username_is_not_found() {
        let f = fixture();

        let err = f.handler.handle(grant("ghost", None)).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn existing_active_subscription_blocks_grant() {
        let f = fixture();
        register(&f, 7, "ann").await;
        f.handler.handle(grant("ann", None)).await.unwrap();

        let err = f.handler.handle(grant("ann", None)).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::AlreadyActive(_)));
        assert_eq!(f.subscriptions.all().await.len(), 1);
    }

    #[tokio::test]
    async fn non_positive_duration_is_rejected() {
        let f = fixture();
        register(&f, 7, "ann").await;

        let err = f.handler.handle(grant("ann", Some(0))).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::ValidationFailed { .. }));
        assert!(f.subscriptions.all().await.is_empty());
    }

    #[tokio::test]
    async fn oversized_duration_is_rejected_without_row() {
        let f = fixture();
        register(&f, 7, "ann").await;

        let err = f
            .handler
            .handle(grant("ann", Some(200_000_000)))
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::ValidationFailed { .. }));
        assert!(f.subscriptions.all().await.is_empty());
        assert!(f.messaging.sent().is_empty());
    }
}
