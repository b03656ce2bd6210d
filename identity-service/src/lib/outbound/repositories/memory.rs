use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Applies the same unique rules as the `users` table, checked and written
/// under one write lock so concurrent inserts cannot both succeed.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::ConstraintViolation("users_email_key".to_string()));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(UserError::ConstraintViolation("users_username_key".to_string()));
        }
        if users.contains_key(&user.id) {
            return Err(UserError::ConstraintViolation("users_pkey".to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_login(&self, identifier: &str) -> Result<Option<User>, UserError> {
        let users = self.users.read().await;

        let by_username = users.values().find(|u| u.username.as_str() == identifier);
        let found = by_username.or_else(|| users.values().find(|u| u.email.as_str() == identifier));

        Ok(found.cloned())
    }

    async fn exists_by_email_or_username(
        &self,
        email: &EmailAddress,
        username: &Username,
    ) -> Result<bool, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| u.email == *email || u.username == *username))
    }

    async fn update_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        user.last_login = Some(at);
        user.updated_at = at;
        Ok(user.clone())
    }

    async fn set_active(&self, id: &UserId, active: bool) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        user.is_active = active;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}
