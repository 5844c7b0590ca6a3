//! Authentication service unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, DecodingKey, Validation};
use mockall::mock;
use mockall::predicate::eq;
use uuid::Uuid;

use store_api::config::Config;
use store_api::domain::{Basket, Password, User};
use store_api::errors::{AppError, AppResult};
use store_api::infra::{
    TransactionContext, TxBasketRepository, TxUserRepository, UnitOfWork, UserRepository,
};
use store_api::services::{AuthService, Authenticator, Claims};

const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";

fn test_config() -> Config {
    Config::new("postgres://unused", TEST_SECRET, 1)
}

fn test_user(id: Uuid, password_hash: &str) -> User {
    User {
        id,
        email: "user@example.com".to_string(),
        password_hash: password_hash.to_string(),
        role: "USER".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn decode_claims(token: &str) -> Claims {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(TEST_SECRET.as_bytes()),
        &Validation::default(),
    )
    .expect("token must decode with the configured secret")
    .claims
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

mock! {
    pub TxUserRepo {}

    #[async_trait]
    impl TxUserRepository for TxUserRepo {
        async fn create(
            &self,
            email: String,
            password_hash: String,
            role: Option<String>,
        ) -> AppResult<User>;
    }
}

mock! {
    pub TxBasketRepo {}

    #[async_trait]
    impl TxBasketRepository for TxBasketRepo {
        async fn create(&self, user_id: Uuid) -> AppResult<Basket>;
    }
}

/// Test Unit of Work that runs transactional closures against mock
/// repositories without commit/rollback machinery.
///
/// Transactional mocks built without expectations fail the test when
/// touched: error paths must not write.
struct TestUnitOfWork {
    user_repo: Arc<MockUserRepo>,
    tx_users: MockTxUserRepo,
    tx_baskets: MockTxBasketRepo,
}

impl TestUnitOfWork {
    fn new(user_repo: MockUserRepo) -> Self {
        Self::with_tx(user_repo, MockTxUserRepo::new(), MockTxBasketRepo::new())
    }

    fn with_tx(
        user_repo: MockUserRepo,
        tx_users: MockTxUserRepo,
        tx_baskets: MockTxBasketRepo,
    ) -> Self {
        Self {
            user_repo: Arc::new(user_repo),
            tx_users,
            tx_baskets,
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
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
        f(TransactionContext::new(&self.tx_users, &self.tx_baskets)).await
    }
}

fn authenticator(repo: MockUserRepo) -> Authenticator<TestUnitOfWork> {
    Authenticator::new(Arc::new(TestUnitOfWork::new(repo)), test_config())
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_duplicate_email_rejected_before_any_write() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email()
        .with(eq("taken@example.com"))
        .returning(|_| Ok(Some(test_user(Uuid::new_v4(), "hash"))));
    // No create expectations: a duplicate registration must not write

    let service = authenticator(repo);
    let result = service
        .register(
            "taken@example.com".to_string(),
            "password123".to_string(),
            None,
        )
        .await;

    match result.unwrap_err() {
        AppError::BadRequest(msg) => {
            assert_eq!(msg, "пользователь с таким email уже существует");
        }
        other => panic!("expected BadRequest, got {:?}", other),
    }
}

#[tokio::test]
async fn test_register_empty_password_rejected() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email().returning(|_| Ok(None));

    let service = authenticator(repo);
    let result = service
        .register("new@example.com".to_string(), String::new(), None)
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn test_register_creates_user_and_basket_and_returns_token() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email().returning(|_| Ok(None));

    // Exactly one user insert, storing a hash that verifies the plaintext
    let mut tx_users = MockTxUserRepo::new();
    tx_users
        .expect_create()
        .withf(|email, hash, role| {
            email.as_str() == "new@example.com"
                && Password::from_hash(hash.clone()).verify("password123")
                && role.is_none()
        })
        .times(1)
        .returning(move |email, hash, _| {
            Ok(User {
                id: user_id,
                email,
                password_hash: hash,
                role: "USER".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });

    // Exactly one basket insert, referencing the created user
    let mut tx_baskets = MockTxBasketRepo::new();
    tx_baskets
        .expect_create()
        .with(eq(user_id))
        .times(1)
        .returning(|user_id| {
            Ok(Basket {
                id: Uuid::new_v4(),
                user_id,
                created_at: Utc::now(),
            })
        });

    let uow = TestUnitOfWork::with_tx(repo, tx_users, tx_baskets);
    let service = Authenticator::new(Arc::new(uow), test_config());

    let token = service
        .register("new@example.com".to_string(), "password123".to_string(), None)
        .await
        .unwrap();

    let claims = decode_claims(&token.access_token);
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "new@example.com");
    assert_eq!(claims.role, "USER");
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_unknown_email() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email().returning(|_| Ok(None));

    let service = authenticator(repo);
    let result = service
        .login("ghost@example.com".to_string(), "password123".to_string())
        .await;

    match result.unwrap_err() {
        AppError::InvalidCredentials(msg) => assert_eq!(msg, "Пользователь не найден"),
        other => panic!("expected InvalidCredentials, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_wrong_password() {
    let hash = Password::new("correct-password").unwrap().into_string();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email()
        .returning(move |_| Ok(Some(test_user(Uuid::new_v4(), &hash))));

    let service = authenticator(repo);
    let result = service
        .login("user@example.com".to_string(), "wrong-password".to_string())
        .await;

    match result.unwrap_err() {
        AppError::InvalidCredentials(msg) => assert_eq!(msg, "Указанный пароль неверен"),
        other => panic!("expected InvalidCredentials, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_success_returns_decodable_token() {
    let user_id = Uuid::new_v4();
    let hash = Password::new("correct-password").unwrap().into_string();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email()
        .returning(move |_| Ok(Some(test_user(user_id, &hash))));

    let service = authenticator(repo);
    let token = service
        .login("user@example.com".to_string(), "correct-password".to_string())
        .await
        .unwrap();

    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.expires_in, 3600);

    let claims = decode_claims(&token.access_token);
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "user@example.com");
    assert_eq!(claims.role, "USER");
    // Token expires exactly one hour after issuance
    assert_eq!(claims.exp - claims.iat, 3600);
}

// =============================================================================
// Token refresh and verification
// =============================================================================

#[tokio::test]
async fn test_refresh_reissues_token_with_same_claims() {
    let user_id = Uuid::new_v4();

    let service = authenticator(MockUserRepo::new());
    let token = service.refresh(user_id, "user@example.com", "ADMIN").unwrap();

    let claims = decode_claims(&token.access_token);
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "user@example.com");
    assert_eq!(claims.role, "ADMIN");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn test_verify_token_roundtrip() {
    let user_id = Uuid::new_v4();

    let service = authenticator(MockUserRepo::new());
    let token = service.refresh(user_id, "user@example.com", "USER").unwrap();

    let claims = service.verify_token(&token.access_token).unwrap();
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "user@example.com");
}

#[tokio::test]
async fn test_verify_token_rejects_garbage() {
    let service = authenticator(MockUserRepo::new());
    let result = service.verify_token("not.a.token");

    assert!(matches!(result.unwrap_err(), AppError::Jwt(_)));
}

#[tokio::test]
async fn test_verify_token_rejects_wrong_secret() {
    let user_id = Uuid::new_v4();

    let service = authenticator(MockUserRepo::new());
    let token = service.refresh(user_id, "user@example.com", "USER").unwrap();

    let other = Authenticator::new(
        Arc::new(TestUnitOfWork::new(MockUserRepo::new())),
        Config::new(
            "postgres://unused",
            "another-secret-key-that-is-32-chars!!",
            1,
        ),
    );

    assert!(other.verify_token(&token.access_token).is_err());
}
