//! Status check handlers behind `GET`/`POST /api/status`.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::status_check::StatusCheck;
use crate::ports::{Clock, StatusCheckRepository};

/// Most records returned by a listing.
pub const STATUS_CHECK_LIST_LIMIT: u32 = 1000;

#[derive(Debug, Clone)]
pub struct RecordStatusCheckCommand {
    pub client_name: String,
}

pub struct StatusCheckHandler {
    repository: Arc<dyn StatusCheckRepository>,
    clock: Arc<dyn Clock>,
}

impl StatusCheckHandler {
    pub fn new(repository: Arc<dyn StatusCheckRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn record(&self, cmd: RecordStatusCheckCommand) -> Result<StatusCheck, DomainError> {
        let check = StatusCheck::new(cmd.client_name, self.clock.now())?;
        self.repository.save(&check).await?;
        Ok(check)
    }

    pub async fn list(&self) -> Result<Vec<StatusCheck>, DomainError> {
        self.repository.list(STATUS_CHECK_LIST_LIMIT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStatusCheckRepository;
    use crate::domain::foundation::ErrorCode;
    use crate::ports::SystemClock;

    fn handler() -> StatusCheckHandler {
        StatusCheckHandler::new(
            Arc::new(InMemoryStatusCheckRepository::new()),
            Arc::new(SystemClock),
        )
    }

    #[tokio::test]
    async fn recorded_checks_are_listed() {
        let handler = handler();

        let check = handler
            .record(RecordStatusCheckCommand {
                client_name: "frontend".to_string(),
            })
            .await
            .unwrap();

        let listed = handler.list().await.unwrap();
        assert_eq!(listed, vec![check]);
    }

    #[tokio::test]
    async fn blank_client_name_is_rejected() {
        let err = handler()
            .record(RecordStatusCheckCommand {
                client_name: " ".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
