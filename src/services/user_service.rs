//! User service - Handles user-related business logic.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::User;
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Update user details; empty-string fields keep the existing value
    async fn update_user(
        &self,
        id: Uuid,
        email: Option<String>,
        role: Option<String>,
    ) -> AppResult<User>;

    /// Delete user
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await
            .map_err(|e| e.with_context("Ошибка при получении пользователя"))?
            .ok_or_not_found()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow
            .users()
            .list()
            .await
            .map_err(|e| e.with_context("Ошибка при получении списка пользователей"))
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: Option<String>,
        role: Option<String>,
    ) -> AppResult<User> {
        // Falsy-overwrite policy: an empty string keeps the stored value
        let email = email.filter(|e| !e.is_empty());
        let role = role.filter(|r| !r.is_empty());

        self.uow
            .users()
            .update(id, email, role)
            .await
            .map_err(|e| e.with_context("Ошибка при обновлении пользователя"))
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.uow
            .users()
            .delete(id)
            .await
            .map_err(|e| e.with_context("Ошибка при удалении пользователя"))
    }
}
