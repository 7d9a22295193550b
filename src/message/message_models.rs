use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    /// URIs of attachments uploaded before the message was sent.
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One (message, profile) read receipt. The sender's own receipt is written
/// in the same transaction as the message; everyone else's appears when they
/// mark the conversation read. `unread -> read` is the only transition.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MessageRead {
    pub message_id: Uuid,
    pub profile_id: Uuid,
    pub read_at: DateTime<Utc>,
}
