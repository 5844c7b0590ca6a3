//! Basket domain entity.
//!
//! A basket is created exactly once, alongside its owning user, and is
//! never updated or deleted through this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Basket domain entity (1:1 with its owning user)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Basket {
    /// Unique basket identifier
    pub id: Uuid,
    /// Owning user identifier
    pub user_id: Uuid,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
