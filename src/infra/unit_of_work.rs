//! Unit of Work pattern implementation.
//!
//! The Unit of Work pattern:
//! - Centralizes access to all repositories
//! - Manages database transactions (begin, commit, rollback)
//! - Ensures consistency across multiple repository operations
//!
//! Registration relies on it so the user and its basket are created as
//! a single atomic unit.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{UserRepository, UserStore};
use crate::domain::{Basket, User};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to repositories and transaction management.
/// Note: This trait is not mockable directly due to the generic
/// `transaction` method. For testing, mock at the repository level and
/// hand the mocks to a test implementation.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is automatically committed on success or rolled back on error.
    /// Uses ReadCommitted isolation level for balanced consistency/performance.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Transaction-scoped user writes.
#[async_trait]
pub trait TxUserRepository: Send + Sync {
    /// Create a new user; role falls back to the default when omitted
    async fn create(
        &self,
        email: String,
        password_hash: String,
        role: Option<String>,
    ) -> AppResult<User>;
}

/// Transaction-scoped basket writes.
#[async_trait]
pub trait TxBasketRepository: Send + Sync {
    /// Create a basket owned by the given user
    async fn create(&self, user_id: Uuid) -> AppResult<Basket>;
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part of
/// the same database transaction. The context lends the repositories as
/// trait objects so transactional code can run against test doubles.
pub struct TransactionContext<'a> {
    users: &'a dyn TxUserRepository,
    baskets: &'a dyn TxBasketRepository,
}

impl<'a> TransactionContext<'a> {
    /// Create a context over the given transaction-scoped repositories
    pub fn new(users: &'a dyn TxUserRepository, baskets: &'a dyn TxBasketRepository) -> Self {
        Self { users, baskets }
    }

    /// Get user repository for this transaction
    pub fn users(&self) -> &'a dyn TxUserRepository {
        self.users
    }

    /// Get basket repository for this transaction
    pub fn baskets(&self) -> &'a dyn TxBasketRepository {
        self.baskets
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        Self { db, user_repo }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // Begin transaction
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        // Execute the closure; the repositories borrow the transaction,
        // so they must go out of scope before commit consumes it
        let result = {
            let users = TxUserStore::new(&txn);
            let baskets = TxBasketStore::new(&txn);
            f(TransactionContext::new(&users, &baskets)).await
        };

        match result {
            Ok(value) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(value)
            }
            Err(e) => {
                // Rollback on error
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware user repository.
///
/// Executes all operations within the provided transaction.
pub struct TxUserStore<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserStore<'a> {
    /// Create new transaction-aware repository
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl TxUserRepository for TxUserStore<'_> {
    async fn create(
        &self,
        email: String,
        password_hash: String,
        role: Option<String>,
    ) -> AppResult<User> {
        use super::repositories::entities::user::ActiveModel;
        use crate::config::ROLE_USER;
        use sea_orm::{ActiveModelTrait, Set};

        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(role.unwrap_or_else(|| ROLE_USER.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(User::from(model))
    }
}

/// Transaction-aware basket repository.
pub struct TxBasketStore<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxBasketStore<'a> {
    /// Create new transaction-aware repository
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl TxBasketRepository for TxBasketStore<'_> {
    async fn create(&self, user_id: Uuid) -> AppResult<Basket> {
        use super::repositories::entities::basket::ActiveModel;
        use sea_orm::{ActiveModelTrait, Set};

        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model
            .insert(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(Basket::from(model))
    }
}
