use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Server-to-client events pushed over the WebSocket channel. Delivery is
/// fire-and-forget; an offline recipient simply misses the event and picks
/// the state up from the REST endpoints instead.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeEvent {
    NewMessage(NewMessagePayload),
    MessagesRead(MessagesReadPayload),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMessagePayload {
    pub conversation_id: Uuid,
    pub message_id: Uuid,
    pub sender_id: Uuid,
    pub sender_display_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessagesReadPayload {
    pub conversation_id: Uuid,
    pub reader_id: Uuid,
    pub message_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_event_serializes_with_snake_case_tag() {
        let event = RealtimeEvent::NewMessage(NewMessagePayload {
            conversation_id: Uuid::new_v4(),
            message_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            sender_display_name: "Ada".into(),
            content: "Hello".into(),
            created_at: Utc::now(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "new_message");
        assert!(json.get("conversationId").is_some());
        assert!(json.get("senderDisplayName").is_some());
    }

    #[test]
    fn messages_read_event_carries_the_read_ids() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let event = RealtimeEvent::MessagesRead(MessagesReadPayload {
            conversation_id: Uuid::new_v4(),
            reader_id: Uuid::new_v4(),
            message_ids: ids.clone(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "messages_read");
        assert_eq!(json["messageIds"].as_array().unwrap().len(), ids.len());
        assert!(json.get("readerId").is_some());
    }
}
