//! Authentication handlers.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::TokenResponse;

/// User registration request.
///
/// Absent email/password keys deserialize to empty strings so both the
/// missing and the empty case fail validation with the same message.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// User email address
    #[serde(default)]
    #[validate(length(min = 1, message = "Некорректный email или password"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password
    #[serde(default)]
    #[validate(length(min = 1, message = "Некорректный email или password"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
    /// Optional role; defaults to "USER" when omitted
    #[schema(example = "USER")]
    pub role: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User email address
    #[serde(default)]
    #[validate(length(min = 1, message = "Некорректный email или password"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password
    #[serde(default)]
    #[validate(length(min = 1, message = "Некорректный email или password"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Create public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/registration", post(registration))
        .route("/login", post(login))
}

/// Create session routes (require a verified identity)
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/check", get(check))
}

/// Register a new user and its basket
#[utoipa::path(
    post,
    path = "/auth/registration",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = TokenResponse),
        (status = 400, description = "Missing fields or email already taken")
    )
)]
pub async fn registration(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .register(payload.email, payload.password, payload.role)
        .await?;

    Ok(Json(token))
}

/// Login and get JWT token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unknown user or wrong password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(token))
}

/// Re-issue a token for the authenticated user
#[utoipa::path(
    get,
    path = "/auth/check",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Fresh token issued", body = TokenResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn check(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.auth_service.refresh(
        current_user.id,
        &current_user.email,
        &current_user.role,
    )?;

    Ok(Json(token))
}
