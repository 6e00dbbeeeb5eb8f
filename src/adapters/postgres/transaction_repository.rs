//! PostgreSQL implementation of TransactionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, TelegramUserId, Timestamp, TransactionId, UserId,
};
use crate::domain::subscription::{Money, PaymentTransaction, TransactionStatus};
use crate::ports::TransactionRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, telegram_user_id, stripe_session_id, stripe_subscription_id,
           amount_minor, currency, status, metadata, created_at, updated_at
    FROM payment_transactions
"#;

pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: Uuid,
    telegram_user_id: i64,
    stripe_session_id: String,
    stripe_subscription_id: Option<String>,
    amount_minor: i64,
    currency: String,
    status: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for PaymentTransaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let status = TransactionStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid transaction status: {}", row.status),
            )
        })?;

        Ok(PaymentTransaction {
            id: TransactionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            telegram_user_id: TelegramUserId::new(row.telegram_user_id),
            checkout_session_id: row.stripe_session_id,
            gateway_subscription_id: row.stripe_subscription_id,
            amount: Money::new(row.amount_minor, row.currency),
            status,
            metadata: row.metadata,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to {} payment transaction: {}", action, e),
    )
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn save(&self, transaction: &PaymentTransaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_transactions (
                id, user_id, telegram_user_id, stripe_session_id, stripe_subscription_id,
                amount_minor, currency, status, metadata, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.user_id.as_uuid())
        .bind(transaction.telegram_user_id.as_i64())
        .bind(&transaction.checkout_session_id)
        .bind(&transaction.gateway_subscription_id)
        .bind(transaction.amount.amount_minor)
        .bind(&transaction.amount.currency)
        .bind(transaction.status.as_str())
        .bind(&transaction.metadata)
        .bind(transaction.created_at.as_datetime())
        .bind(transaction.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save", e))?;

        Ok(())
    }

    async fn update(&self, transaction: &PaymentTransaction) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payment_transactions SET
                stripe_subscription_id = $2,
                status = $3,
                metadata = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(&transaction.gateway_subscription_id)
        .bind(transaction.status.as_str())
        .bind(&transaction.metadata)
        .bind(transaction.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                "Payment transaction not found",
            ));
        }
        Ok(())
    }

    async fn find_by_session_id(
        &self,
        checkout_session_id: &str,
    ) -> Result<Option<PaymentTransaction>, DomainError> {
        let row: Option<TransactionRow> =
            sqlx::query_as(&format!("{} WHERE stripe_session_id = $1", SELECT_COLUMNS))
                .bind(checkout_session_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("find", e))?;

        row.map(PaymentTransaction::try_from).transpose()
    }

    async fn completed_revenue(&self) -> Result<i64, DomainError> {
        let (total,): (Option<i64>,) = sqlx::query_as(
            "SELECT SUM(amount_minor)::BIGINT FROM payment_transactions WHERE status = 'completed'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("sum", e))?;

        Ok(total.unwrap_or(0))
    }

    async fn list_recent_completed(
        &self,
        limit: u32,
    ) -> Result<Vec<PaymentTransaction>, DomainError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "{} WHERE status = 'completed' ORDER BY created_at DESC LIMIT $1",
            SELECT_COLUMNS
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list", e))?;

        rows.into_iter().map(PaymentTransaction::try_from).collect()
    }
}
