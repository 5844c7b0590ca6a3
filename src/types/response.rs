use serde::Serialize;
use utoipa::ToSchema;

/// Message-only response (used for delete confirmations)
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable confirmation message
    #[schema(example = "Пользователь удален")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
