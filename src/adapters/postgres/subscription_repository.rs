//! PostgreSQL implementation of SubscriptionRepository.
//!
//! The `subscriptions_one_active_per_user` partial unique index backs the
//! at-most-one-active rule; violations surface as `SubscriptionAlreadyActive`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, SubscriptionId, TelegramUserId, Timestamp, UserId,
};
use crate::domain::subscription::{
    BillingPeriod, GatewayRefs, Money, Subscription, SubscriptionStatus,
};
use crate::ports::{SubscriptionCounts, SubscriptionRepository};

const ONE_ACTIVE_CONSTRAINT: &str = "subscriptions_one_active_per_user";

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, telegram_user_id, stripe_subscription_id, stripe_customer_id,
           stripe_product_id, stripe_price_id, status, amount_minor, currency,
           current_period_start, current_period_end, created_at, updated_at
    FROM subscriptions
"#;

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    telegram_user_id: i64,
    stripe_subscription_id: Option<String>,
    stripe_customer_id: Option<String>,
    stripe_product_id: Option<String>,
    stripe_price_id: Option<String>,
    status: String,
    amount_minor: i64,
    currency: String,
    current_period_start: Option<DateTime<Utc>>,
    current_period_end: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status = SubscriptionStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid status value: {}", row.status),
            )
        })?;

        let period = match (row.current_period_start, row.current_period_end) {
            (Some(start), Some(end)) => Some(
                BillingPeriod::new(Timestamp::from_datetime(start), Timestamp::from_datetime(end))
                    .map_err(|e| {
                        DomainError::new(
                            ErrorCode::DatabaseError,
                            format!("Invalid billing period: {}", e),
                        )
                    })?,
            ),
            _ => None,
        };

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            telegram_user_id: TelegramUserId::new(row.telegram_user_id),
            gateway: GatewayRefs {
                subscription_id: row.stripe_subscription_id,
                customer_id: row.stripe_customer_id,
                product_id: row.stripe_product_id,
                price_id: row.stripe_price_id,
            },
            status,
            price: Money::new(row.amount_minor, row.currency),
            period,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn map_write_error(e: sqlx::Error, action: &str) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.constraint() == Some(ONE_ACTIVE_CONSTRAINT) {
            return DomainError::new(
                ErrorCode::SubscriptionAlreadyActive,
                "User already has an active subscription",
            );
        }
    }
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to {} subscription: {}", action, e),
    )
}

fn read_error(e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to query subscriptions: {}", e),
    )
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, telegram_user_id, stripe_subscription_id, stripe_customer_id,
                stripe_product_id, stripe_price_id, status, amount_minor, currency,
                current_period_start, current_period_end, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_uuid())
        .bind(subscription.telegram_user_id.as_i64())
        .bind(&subscription.gateway.subscription_id)
        .bind(&subscription.gateway.customer_id)
        .bind(&subscription.gateway.product_id)
        .bind(&subscription.gateway.price_id)
        .bind(subscription.status.as_str())
        .bind(subscription.price.amount_minor)
        .bind(&subscription.price.currency)
        .bind(subscription.period.map(|p| *p.start.as_datetime()))
        .bind(subscription.period.map(|p| *p.end.as_datetime()))
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "save"))?;

        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                stripe_subscription_id = $2,
                stripe_customer_id = $3,
                stripe_product_id = $4,
                stripe_price_id = $5,
                status = $6,
                current_period_start = $7,
                current_period_end = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(&subscription.gateway.subscription_id)
        .bind(&subscription.gateway.customer_id)
        .bind(&subscription.gateway.product_id)
        .bind(&subscription.gateway.price_id)
        .bind(subscription.status.as_str())
        .bind(subscription.period.map(|p| *p.start.as_datetime()))
        .bind(subscription.period.map(|p| *p.end.as_datetime()))
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "update"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(read_error)?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_gateway_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "{} WHERE stripe_subscription_id = $1",
            SELECT_COLUMNS
        ))
        .bind(gateway_subscription_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error)?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_active_by_telegram_user(
        &self,
        telegram_user_id: TelegramUserId,
    ) -> Result<Vec<Subscription>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "{} WHERE telegram_user_id = $1 AND status = 'active' ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(telegram_user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(read_error)?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn find_lapsed(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            r#"{} WHERE status = 'active'
                  AND current_period_end IS NOT NULL
                  AND current_period_end < $1
                ORDER BY current_period_end ASC"#,
            SELECT_COLUMNS
        ))
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(read_error)?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn expire_if_lapsed(
        &self,
        id: &SubscriptionId,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET status = 'expired', updated_at = $2
            WHERE id = $1
              AND status = 'active'
              AND current_period_end IS NOT NULL
              AND current_period_end < $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "expire"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_active(&self, limit: Option<u32>) -> Result<Vec<Subscription>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "{} WHERE status = 'active' ORDER BY created_at DESC LIMIT $1",
            SELECT_COLUMNS
        ))
        .bind(limit.map(i64::from))
        .fetch_all(&self.pool)
        .await
        .map_err(read_error)?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn count_by_status(&self) -> Result<SubscriptionCounts, DomainError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM subscriptions GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(read_error)?;

        let mut counts = SubscriptionCounts::default();
        for (status, count) in rows {
            let count = count.max(0) as u64;
            match SubscriptionStatus::parse(&status) {
                Some(SubscriptionStatus::Pending) => counts.pending = count,
                Some(SubscriptionStatus::Active) => counts.active = count,
                Some(SubscriptionStatus::Canceled) => counts.canceled = count,
                Some(SubscriptionStatus::Expired) => counts.expired = count,
                None => {
                    tracing::warn!(status = %status, "Unknown subscription status in database");
                }
            }
        }
        Ok(counts)
    }
}
