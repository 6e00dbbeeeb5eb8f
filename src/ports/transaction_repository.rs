//! Payment transaction repository port.
//!
//! Write-mostly audit trail of checkout sessions. Rows are never deleted.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::PaymentTransaction;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn save(&self, transaction: &PaymentTransaction) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `TransactionNotFound` if the row does not exist
    async fn update(&self, transaction: &PaymentTransaction) -> Result<(), DomainError>;

    async fn find_by_session_id(
        &self,
        checkout_session_id: &str,
    ) -> Result<Option<PaymentTransaction>, DomainError>;

    /// Sum of completed transaction amounts in minor units.
    async fn completed_revenue(&self) -> Result<i64, DomainError>;

    /// Completed transactions, newest first.
    async fn list_recent_completed(
        &self,
        limit: u32,
    ) -> Result<Vec<PaymentTransaction>, DomainError>;
}
