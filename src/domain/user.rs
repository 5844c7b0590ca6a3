//! User domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User domain entity.
///
/// Serialized in full, including the stored password hash: the list and
/// get-by-id operations return records exactly as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address (unique)
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Bcrypt password hash as stored
    pub password_hash: String,
    /// User role ("USER" or "ADMIN")
    #[schema(example = "USER")]
    pub role: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}
