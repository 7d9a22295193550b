use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A persisted notification, written best-effort when a message arrives.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub title: String,
    pub body: String,
    pub conversation_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
