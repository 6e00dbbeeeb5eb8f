//! In-memory UserRepository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, TelegramUserId, UserId};
use crate::domain::user::User;
use crate::ports::UserRepository;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<TelegramUserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert_if_absent(&self, user: &User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        Ok(users
            .entry(user.telegram_user_id)
            .or_insert_with(|| user.clone())
            .clone())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.id == *id)
            .cloned())
    }

    async fn find_by_telegram_id(
        &self,
        telegram_user_id: TelegramUserId,
    ) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(&telegram_user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.username.as_deref() == Some(username))
            .min_by_key(|u| u.created_at)
            .cloned())
    }

    async fn update_email(&self, id: &UserId, email: &str) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let user = users
            .values_mut()
            .find(|u| u.id == *id)
            .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "User not found"))?;
        user.email = Some(email.to_string());
        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.users.read().await.len() as u64)
    }
}
