//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSubscriptionRepository` - subscription records
//! - `PostgresUserRepository` - chat user profiles
//! - `PostgresTransactionRepository` - checkout audit trail
//! - `PostgresWebhookEventRepository` - webhook idempotency claims
//! - `PostgresStatusCheckRepository` - diagnostic records

mod status_check_repository;
mod subscription_repository;
mod transaction_repository;
mod user_repository;
mod webhook_event_repository;

pub use status_check_repository::PostgresStatusCheckRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
pub use transaction_repository::PostgresTransactionRepository;
pub use user_repository::PostgresUserRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;

use sqlx::PgPool;

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
