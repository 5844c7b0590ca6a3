//! Authentication service - registration, login and token issuance.
//!
//! Password hashing lives in the domain Password value object; token
//! signing uses the Config carried by the service, never ambient state.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::Password;
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 3600)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user with its basket and return a JWT token
    async fn register(
        &self,
        email: String,
        password: String,
        role: Option<String>,
    ) -> AppResult<TokenResponse>;

    /// Login and return a JWT token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Re-issue a token for an already-verified identity
    fn refresh(&self, id: Uuid, email: &str, role: &str) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Generate JWT token for an identity (shared helper to avoid duplication)
fn generate_token(id: Uuid, email: &str, role: &str, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: id,
        email: email.to_owned(),
        role: role.to_owned(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(
        &self,
        email: String,
        password: String,
        role: Option<String>,
    ) -> AppResult<TokenResponse> {
        // Presence of email/password is enforced by the handler's
        // ValidatedJson extractor before we get here.
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::bad_request(
                "пользователь с таким email уже существует",
            ));
        }

        let password_hash = Password::new(&password)?.into_string();

        // User and basket are created as one atomic unit; the unique email
        // constraint turns a concurrent duplicate registration into a rollback.
        let user = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let user = ctx.users().create(email, password_hash, role).await?;
                    ctx.baskets().create(user.id).await?;
                    Ok(user)
                })
            })
            .await?;

        generate_token(user.id, &user.email, &user.role, &self.config)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self
            .uow
            .users()
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::invalid_credentials("Пользователь не найден"))?;

        let stored = Password::from_hash(user.password_hash.clone());
        if !stored.verify(&password) {
            return Err(AppError::invalid_credentials("Указанный пароль неверен"));
        }

        generate_token(user.id, &user.email, &user.role, &self.config)
    }

    fn refresh(&self, id: Uuid, email: &str, role: &str) -> AppResult<TokenResponse> {
        generate_token(id, email, role, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}
