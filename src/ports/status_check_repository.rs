//! Status check repository port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::status_check::StatusCheck;

#[async_trait]
pub trait StatusCheckRepository: Send + Sync {
    async fn save(&self, check: &StatusCheck) -> Result<(), DomainError>;

    /// At most `limit` checks, oldest first.
    async fn list(&self, limit: u32) -> Result<Vec<StatusCheck>, DomainError>;
}
