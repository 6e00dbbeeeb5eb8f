//! PostgreSQL implementation of WebhookEventRepository.
//!
//! The event id is the primary key, so the insert in `try_claim` is the
//! race arbiter between concurrent deliveries. A conflicting row is only
//! overwritten when it is a `processing` claim older than the stale cutoff.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{
    SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome, STALE_CLAIM_SECS,
};

pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    event_id: String,
    event_type: String,
    processed_at: DateTime<Utc>,
    result: String,
    error_message: Option<String>,
    payload: serde_json::Value,
}

impl TryFrom<WebhookEventRow> for WebhookEventRecord {
    type Error = DomainError;

    fn try_from(row: WebhookEventRow) -> Result<Self, Self::Error> {
        let result = WebhookOutcome::parse(&row.result).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid webhook result: {}", row.result),
            )
        })?;

        Ok(WebhookEventRecord {
            event_id: row.event_id,
            event_type: row.event_type,
            processed_at: Timestamp::from_datetime(row.processed_at),
            result,
            error_message: row.error_message,
            payload: row.payload,
        })
    }
}

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to {} webhook event: {}", action, e),
    )
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        let row: Option<WebhookEventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, processed_at, result, error_message, payload
            FROM stripe_webhook_events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find", e))?;

        row.map(WebhookEventRecord::try_from).transpose()
    }

    async fn try_claim(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let stale_before = record.processed_at.add_secs(-STALE_CLAIM_SECS);

        let result = sqlx::query(
            r#"
            INSERT INTO stripe_webhook_events (
                event_id, event_type, processed_at, result, error_message, payload
            ) VALUES ($1, $2, $3, $4, NULL, $5)
            ON CONFLICT (event_id) DO UPDATE SET
                processed_at = EXCLUDED.processed_at,
                error_message = NULL
            WHERE stripe_webhook_events.result = 'processing'
              AND stripe_webhook_events.processed_at < $6
            "#,
        )
        .bind(&record.event_id)
        .bind(&record.event_type)
        .bind(record.processed_at.as_datetime())
        .bind(WebhookOutcome::Processing.as_str())
        .bind(&record.payload)
        .bind(stale_before.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("claim", e))?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }

    async fn complete(
        &self,
        event_id: &str,
        result: WebhookOutcome,
        error_message: Option<String>,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE stripe_webhook_events
            SET result = $2, error_message = $3, processed_at = $4
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .bind(result.as_str())
        .bind(error_message)
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("complete", e))?;

        Ok(())
    }

    async fn release(&self, event_id: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM stripe_webhook_events WHERE event_id = $1 AND result = 'processing'")
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("release", e))?;

        Ok(())
    }

    async fn delete_before(&self, timestamp: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "DELETE FROM stripe_webhook_events WHERE processed_at < $1 AND result <> 'processing'",
        )
        .bind(timestamp.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("purge", e))?;

        Ok(result.rows_affected())
    }
}
