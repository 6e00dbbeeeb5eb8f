//! PostgreSQL implementation of UserRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, TelegramUserId, Timestamp, UserId};
use crate::domain::user::User;
use crate::ports::UserRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, telegram_user_id, telegram_username, first_name, last_name,
           email, is_admin, created_at
    FROM users
"#;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    telegram_user_id: i64,
    telegram_username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::from_uuid(row.id),
            telegram_user_id: TelegramUserId::new(row.telegram_user_id),
            username: row.telegram_username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_admin: row.is_admin,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to {} user: {}", action, e),
    )
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert_if_absent(&self, user: &User) -> Result<User, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, telegram_user_id, telegram_username, first_name, last_name,
                email, is_admin, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (telegram_user_id) DO NOTHING
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.telegram_user_id.as_i64())
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.is_admin)
        .bind(user.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert", e))?;

        self.find_by_telegram_id(user.telegram_user_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "User vanished after insert"))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find", e))?;

        Ok(row.map(User::from))
    }

    async fn find_by_telegram_id(
        &self,
        telegram_user_id: TelegramUserId,
    ) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("{} WHERE telegram_user_id = $1", SELECT_COLUMNS))
                .bind(telegram_user_id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("find", e))?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "{} WHERE telegram_username = $1 ORDER BY created_at ASC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find", e))?;

        Ok(row.map(User::from))
    }

    async fn update_email(&self, id: &UserId, email: &str) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET email = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("update", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("count", e))?;

        Ok(count.max(0) as u64)
    }
}
