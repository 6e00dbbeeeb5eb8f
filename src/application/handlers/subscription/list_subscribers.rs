//! ListSubscribersHandler - active subscriptions joined with their users.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::Subscription;
use crate::domain::user::User;
use crate::ports::{SubscriptionRepository, UserRepository};

#[derive(Debug, Clone)]
pub struct Subscriber {
    pub subscription: Subscription,
    /// Missing only if the user row was removed out of band.
    pub user: Option<User>,
}

pub struct ListSubscribersHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    users: Arc<dyn UserRepository>,
}

impl ListSubscribersHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            subscriptions,
            users,
        }
    }

    /// Active subscribers, newest first.
    pub async fn handle(&self, limit: Option<u32>) -> Result<Vec<Subscriber>, DomainError> {
        let active = self.subscriptions.list_active(limit).await?;
        let mut subscribers = Vec::with_capacity(active.len());
        for subscription in active {
            let user = self.users.find_by_id(&subscription.user_id).await?;
            subscribers.push(Subscriber { subscription, user });
        }
        Ok(subscribers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemorySubscriptionRepository, InMemoryUserRepository};
    use crate::domain::foundation::{TelegramUserId, Timestamp};
    use crate::domain::subscription::{BillingPeriod, Money};

    #[tokio::test]
    async fn joins_active_subscriptions_with_users() {
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let now = Timestamp::now();
        let user = User::register(TelegramUserId::new(3), Some("bo".to_string()), None, None, false, now);
        users.insert_if_absent(&user).await.unwrap();
        let mut expired = Subscription::grant_manual(
            user.id,
            TelegramUserId::new(3),
            Money::new(1, "UAH"),
            BillingPeriod::starting_at(now, 1).unwrap(),
            now,
        );
        expired.expire(now).unwrap();
        subscriptions.save(&expired).await.unwrap();
        let active = Subscription::grant_manual(
            user.id,
            TelegramUserId::new(3),
            Money::new(1, "UAH"),
            BillingPeriod::starting_at(now, 30).unwrap(),
            now,
        );
        subscriptions.save(&active).await.unwrap();

        let handler = ListSubscribersHandler::new(subscriptions, users);
        let listed = handler.handle(None).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].subscription.id, active.id);
        assert_eq!(listed[0].user.as_ref().unwrap().username.as_deref(), Some("bo"));
    }
}
