//! In-memory TransactionRepository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, TransactionId};
use crate::domain::subscription::PaymentTransaction;
use crate::ports::TransactionRepository;

#[derive(Default)]
pub struct InMemoryTransactionRepository {
    rows: RwLock<HashMap<TransactionId, PaymentTransaction>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<PaymentTransaction> {
        self.rows.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn save(&self, transaction: &PaymentTransaction) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;
        if rows
            .values()
            .any(|t| t.checkout_session_id == transaction.checkout_session_id)
        {
            return Err(DomainError::database("Duplicate checkout session id"));
        }
        rows.insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn update(&self, transaction: &PaymentTransaction) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&transaction.id) {
            Some(existing) => {
                *existing = transaction.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                "Payment transaction not found",
            )),
        }
    }

    async fn find_by_session_id(
        &self,
        checkout_session_id: &str,
    ) -> Result<Option<PaymentTransaction>, DomainError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|t| t.checkout_session_id == checkout_session_id)
            .cloned())
    }

    async fn completed_revenue(&self) -> Result<i64, DomainError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|t| t.is_completed())
            .map(|t| t.amount.amount_minor)
            .sum())
    }

    async fn list_recent_completed(
        &self,
        limit: u32,
    ) -> Result<Vec<PaymentTransaction>, DomainError> {
        let mut rows: Vec<_> = self
            .rows
            .read()
            .await
            .values()
            .filter(|t| t.is_completed())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}
