//! User repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TelegramUserId, UserId};
use crate::domain::user::User;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert `user` unless a user with the same chat id already exists.
    ///
    /// Returns the stored user, which is the pre-existing one on conflict.
    async fn insert_if_absent(&self, user: &User) -> Result<User, DomainError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn find_by_telegram_id(
        &self,
        telegram_user_id: TelegramUserId,
    ) -> Result<Option<User>, DomainError>;

    /// Exact, case-sensitive username match without the leading `@`.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// # Errors
    ///
    /// - `UserNotFound` if the user does not exist
    async fn update_email(&self, id: &UserId, email: &str) -> Result<(), DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}
