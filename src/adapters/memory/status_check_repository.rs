//! In-memory StatusCheckRepository.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::domain::status_check::StatusCheck;
use crate::ports::StatusCheckRepository;

#[derive(Default)]
pub struct InMemoryStatusCheckRepository {
    checks: RwLock<Vec<StatusCheck>>,
}

impl InMemoryStatusCheckRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusCheckRepository for InMemoryStatusCheckRepository {
    async fn save(&self, check: &StatusCheck) -> Result<(), DomainError> {
        self.checks.write().await.push(check.clone());
        Ok(())
    }

    async fn list(&self, limit: u32) -> Result<Vec<StatusCheck>, DomainError> {
        let mut checks = self.checks.read().await.clone();
        checks.sort_by_key(|c| c.timestamp);
        checks.truncate(limit as usize);
        Ok(checks)
    }
}
