use serde::Serialize;
use utoipa::ToSchema;

/// Body returned by mutations that have nothing else to say (deletes,
/// read-state updates).
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
