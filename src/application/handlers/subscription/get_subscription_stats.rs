//! GetSubscriptionStatsHandler - admin dashboard figures.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::{Money, PaymentTransaction};
use crate::ports::{SubscriptionCounts, SubscriptionRepository, TransactionRepository, UserRepository};

pub const RECENT_TRANSACTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct SubscriptionStats {
    pub total_users: u64,
    pub counts: SubscriptionCounts,
    /// Sum of completed transactions in the plan currency.
    pub total_revenue: Money,
    pub recent_transactions: Vec<PaymentTransaction>,
}

pub struct GetSubscriptionStatsHandler {
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    transactions: Arc<dyn TransactionRepository>,
    currency: String,
}

impl GetSubscriptionStatsHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        transactions: Arc<dyn TransactionRepository>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            users,
            subscriptions,
            transactions,
            currency: currency.into(),
        }
    }

    pub async fn handle(&self) -> Result<SubscriptionStats, DomainError> {
        let (total_users, counts, total_revenue_minor, recent_transactions) = tokio::try_join!(
            self.users.count(),
            self.subscriptions.count_by_status(),
            self.transactions.completed_revenue(),
            self.transactions.list_recent_completed(RECENT_TRANSACTIONS),
        )?;

        Ok(SubscriptionStats {
            total_users,
            counts,
            total_revenue: Money::new(total_revenue_minor, self.currency.clone()),
            recent_transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemorySubscriptionRepository, InMemoryTransactionRepository, InMemoryUserRepository,
    };
    use crate::domain::foundation::{TelegramUserId, Timestamp, UserId};

    #[tokio::test]
    async fn revenue_counts_only_completed_transactions() {
        let transactions = Arc::new(InMemoryTransactionRepository::new());
        let now = Timestamp::now();
        for (session, complete) in [("cs_1", true), ("cs_2", false), ("cs_3", true)] {
            let mut tx = PaymentTransaction::initiate(
                UserId::new(),
                TelegramUserId::new(1),
                session,
                Money::new(999, "UAH"),
                now,
            );
            if complete {
                tx.complete(Some(format!("sub_{}", session)), now);
            }
            transactions.save(&tx).await.unwrap();
        }

        let handler = GetSubscriptionStatsHandler::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemorySubscriptionRepository::new()),
            transactions,
            "UAH",
        );
        let stats = handler.handle().await.unwrap();

        assert_eq!(stats.total_revenue, Money::new(1_998, "UAH"));
        assert_eq!(stats.recent_transactions.len(), 2);
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.counts, SubscriptionCounts::default());
    }
}
