//! PostgreSQL implementation of StatusCheckRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, StatusCheckId, Timestamp};
use crate::domain::status_check::StatusCheck;
use crate::ports::StatusCheckRepository;

pub struct PostgresStatusCheckRepository {
    pool: PgPool,
}

impl PostgresStatusCheckRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatusCheckRow {
    id: Uuid,
    client_name: String,
    timestamp: DateTime<Utc>,
}

#[async_trait]
impl StatusCheckRepository for PostgresStatusCheckRepository {
    async fn save(&self, check: &StatusCheck) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO status_checks (id, client_name, timestamp) VALUES ($1, $2, $3)")
            .bind(check.id.as_uuid())
            .bind(&check.client_name)
            .bind(check.timestamp.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to save status check: {}", e),
                )
            })?;

        Ok(())
    }

    async fn list(&self, limit: u32) -> Result<Vec<StatusCheck>, DomainError> {
        let rows: Vec<StatusCheckRow> = sqlx::query_as(
            "SELECT id, client_name, timestamp FROM status_checks ORDER BY timestamp ASC LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list status checks: {}", e),
            )
        })?;

        Ok(rows
            .into_iter()
            .map(|row| StatusCheck {
                id: StatusCheckId::from_uuid(row.id),
                client_name: row.client_name,
                timestamp: Timestamp::from_datetime(row.timestamp),
            })
            .collect())
    }
}
