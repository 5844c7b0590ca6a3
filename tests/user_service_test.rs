//! User service unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;
use mockall::predicate::eq;
use uuid::Uuid;

use store_api::domain::User;
use store_api::errors::{AppError, AppResult};
use store_api::infra::{TransactionContext, UnitOfWork, UserRepository};
use store_api::services::{UserManager, UserService};

fn create_test_user(id: Uuid) -> User {
    User {
        id,
        email: "test@example.com".to_string(),
        password_hash: "hashed".to_string(),
        role: "USER".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

mock! {
    pub UserRepo {}

    #[async_trait]
    impl UserRepository for UserRepo {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
        async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
        async fn update(
            &self,
            id: Uuid,
            email: Option<String>,
            role: Option<String>,
        ) -> AppResult<User>;
        async fn delete(&self, id: Uuid) -> AppResult<()>;
        async fn list(&self) -> AppResult<Vec<User>>;
    }
}

/// Test mock for UnitOfWork that wraps mock repositories
struct TestUnitOfWork {
    user_repo: Arc<MockUserRepo>,
}

impl TestUnitOfWork {
    fn new(user_repo: MockUserRepo) -> Self {
        Self {
            user_repo: Arc::new(user_repo),
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // Transaction not supported in test mock
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

#[tokio::test]
async fn test_get_user_success() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .with(eq(user_id))
        .returning(|id| Ok(Some(create_test_user(id))));

    let uow = TestUnitOfWork::new(repo);
    let service = UserManager::new(Arc::new(uow));
    let result = service.get_user(user_id).await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap().id, user_id);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let uow = TestUnitOfWork::new(repo);
    let service = UserManager::new(Arc::new(uow));
    let result = service.get_user(user_id).await;

    assert!(result.is_err());
    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn test_list_users_success() {
    let mut repo = MockUserRepo::new();
    repo.expect_list().returning(|| {
        Ok(vec![
            create_test_user(Uuid::new_v4()),
            create_test_user(Uuid::new_v4()),
        ])
    });

    let uow = TestUnitOfWork::new(repo);
    let service = UserManager::new(Arc::new(uow));
    let result = service.list_users().await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_users_db_failure_reports_operation_message() {
    let mut repo = MockUserRepo::new();
    repo.expect_list()
        .returning(|| Err(AppError::Database(sea_orm::DbErr::Custom("boom".into()))));

    let uow = TestUnitOfWork::new(repo);
    let service = UserManager::new(Arc::new(uow));
    let result = service.list_users().await;

    match result.unwrap_err() {
        AppError::Internal(msg) => {
            assert_eq!(msg, "Ошибка при получении списка пользователей");
        }
        other => panic!("expected Internal, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_user_db_failure_reports_operation_message() {
    let mut repo = MockUserRepo::new();
    repo.expect_update()
        .returning(|_, _, _| Err(AppError::Database(sea_orm::DbErr::Custom("boom".into()))));

    let uow = TestUnitOfWork::new(repo);
    let service = UserManager::new(Arc::new(uow));
    let result = service.update_user(Uuid::new_v4(), None, None).await;

    match result.unwrap_err() {
        AppError::Internal(msg) => {
            assert_eq!(msg, "Ошибка при обновлении пользователя");
        }
        other => panic!("expected Internal, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_user_role_only_keeps_email() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    // The repository must receive None for email so the stored value stays
    repo.expect_update()
        .with(eq(user_id), eq(None::<String>), eq(Some("ADMIN".to_string())))
        .returning(|id, _, role| {
            let mut user = create_test_user(id);
            if let Some(role) = role {
                user.role = role;
            }
            Ok(user)
        });

    let uow = TestUnitOfWork::new(repo);
    let service = UserManager::new(Arc::new(uow));
    let result = service
        .update_user(user_id, None, Some("ADMIN".to_string()))
        .await
        .unwrap();

    assert_eq!(result.role, "ADMIN");
    assert_eq!(result.email, "test@example.com");
}

#[tokio::test]
async fn test_update_user_empty_strings_treated_as_absent() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    // Empty strings are falsy: the repository must see both fields as None
    repo.expect_update()
        .with(eq(user_id), eq(None::<String>), eq(None::<String>))
        .returning(|id, _, _| Ok(create_test_user(id)));

    let uow = TestUnitOfWork::new(repo);
    let service = UserManager::new(Arc::new(uow));
    let result = service
        .update_user(user_id, Some(String::new()), Some(String::new()))
        .await
        .unwrap();

    assert_eq!(result.email, "test@example.com");
    assert_eq!(result.role, "USER");
}

#[tokio::test]
async fn test_update_user_email_only_keeps_role() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_update()
        .with(
            eq(user_id),
            eq(Some("new@example.com".to_string())),
            eq(None::<String>),
        )
        .returning(|id, email, _| {
            let mut user = create_test_user(id);
            if let Some(email) = email {
                user.email = email;
            }
            Ok(user)
        });

    let uow = TestUnitOfWork::new(repo);
    let service = UserManager::new(Arc::new(uow));
    let result = service
        .update_user(user_id, Some("new@example.com".to_string()), None)
        .await
        .unwrap();

    assert_eq!(result.email, "new@example.com");
    assert_eq!(result.role, "USER");
}

#[tokio::test]
async fn test_update_user_not_found() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_update().returning(|_, _, _| Err(AppError::NotFound));

    let uow = TestUnitOfWork::new(repo);
    let service = UserManager::new(Arc::new(uow));
    let result = service.update_user(user_id, None, None).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn test_delete_user_success() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_delete().with(eq(user_id)).returning(|_| Ok(()));

    let uow = TestUnitOfWork::new(repo);
    let service = UserManager::new(Arc::new(uow));
    let result = service.delete_user(user_id).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_delete_user_not_found() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_delete().returning(|_| Err(AppError::NotFound));

    let uow = TestUnitOfWork::new(repo);
    let service = UserManager::new(Arc::new(uow));
    let result = service.delete_user(user_id).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}
