use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Body of `POST /api/messages`. Either an existing `conversationId` or a
/// `recipientId` to open a new conversation with; never both required.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub conversation_id: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    /// Already-uploaded attachment URIs.
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Job the new conversation is about, if any.
    pub job_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Public display data of a conversation counterpart.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastMessageSummary {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
}

/// One row of the caller's inbox: counterpart display data, latest message,
/// the job the conversation hangs off, and how many messages by others still
/// lack the caller's receipt.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: Uuid,
    pub participants: Vec<ParticipantSummary>,
    pub last_message: Option<LastMessageSummary>,
    pub job: Option<JobSummary>,
    pub unread_count: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceiptEntry {
    pub profile_id: Uuid,
    pub read_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: ParticipantSummary,
    pub content: String,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub read_by: Vec<ReadReceiptEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageHistoryResponse {
    pub messages: Vec<MessageResponse>,
    pub total: i64,
    pub page: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_parses_camel_case_and_defaults_attachments() {
        let body = serde_json::json!({
            "recipientId": "7f2c1a80-3c4f-4ac0-9c5e-2f3d58a1b9aa",
            "content": "Hi there",
            "jobId": null
        });
        let parsed: SendMessageRequest = serde_json::from_value(body).unwrap();
        assert!(parsed.conversation_id.is_none());
        assert!(parsed.recipient_id.is_some());
        assert!(parsed.attachments.is_empty());
    }

    #[test]
    fn conversation_summary_serializes_camel_case() {
        let summary = ConversationSummary {
            id: Uuid::new_v4(),
            participants: vec![ParticipantSummary {
                id: Uuid::new_v4(),
                display_name: "Ada".into(),
                avatar_url: None,
            }],
            last_message: None,
            job: Some(JobSummary {
                id: Uuid::new_v4(),
                title: "Logo needed".into(),
            }),
            unread_count: 2,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("unreadCount").is_some());
        assert!(json.get("lastMessage").is_some());
        assert!(json["participants"][0].get("displayName").is_some());
        assert!(json["job"].get("title").is_some());
    }
}
