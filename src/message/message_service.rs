use crate::{
    error::{AppError, Result},
    message::{
        message_dto::{MessageResponse, ParticipantSummary, SendMessageRequest},
        message_repository::MessageRepository,
    },
    profile::{Profile, ProfileRepository},
};
use uuid::Uuid;

/// Notification bodies carry at most this many characters of the message.
const PREVIEW_LEN: usize = 50;

/// Truncate a message body for its notification preview. Operates on chars,
/// never slicing through a UTF-8 boundary.
pub fn truncate_preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_LEN {
        content.to_string()
    } else {
        let mut preview: String = content.chars().take(PREVIEW_LEN).collect();
        preview.push('…');
        preview
    }
}

#[derive(Clone)]
pub struct MessageService {
    message_repository: MessageRepository,
    profile_repository: ProfileRepository,
}

impl MessageService {
    pub fn new(
        message_repository: MessageRepository,
        profile_repository: ProfileRepository,
    ) -> Self {
        Self {
            message_repository,
            profile_repository,
        }
    }

    /// Resolve the conversation a message goes into. A supplied id must
    /// already include the sender; one is never joined by guessing it.
    /// Without an id the named recipient must exist, and a fresh two-party
    /// conversation is created.
    pub async fn resolve_conversation(
        &self,
        sender_id: Uuid,
        payload: &SendMessageRequest,
    ) -> Result<Uuid> {
        if let Some(conversation_id) = payload.conversation_id {
            if !self
                .message_repository
                .is_participant(conversation_id, sender_id)
                .await?
            {
                return Err(AppError::NotFound("Conversation not found".to_string()));
            }
            return Ok(conversation_id);
        }

        let recipient_id = payload
            .recipient_id
            .ok_or_else(|| AppError::BadRequest("recipientId is required".to_string()))?;

        self.profile_repository
            .find_by_id(recipient_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipient not found".to_string()))?;

        self.message_repository
            .create_conversation(sender_id, recipient_id, payload.job_id)
            .await
    }

    /// Persist the message with the sender's own receipt and return it shaped
    /// for the response.
    pub async fn send_message(
        &self,
        sender: &Profile,
        conversation_id: Uuid,
        payload: &SendMessageRequest,
    ) -> Result<MessageResponse> {
        let (message, self_receipt) = self
            .message_repository
            .create_message(conversation_id, sender.id, &payload.content, &payload.attachments)
            .await?;

        Ok(MessageResponse {
            id: message.id,
            conversation_id: message.conversation_id,
            sender: ParticipantSummary {
                id: sender.id,
                display_name: sender.display_name.clone(),
                avatar_url: sender.avatar_url.clone(),
            },
            content: message.content,
            attachments: message.attachments,
            created_at: message.created_at,
            read_by: vec![(&self_receipt).into()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_pass_through_untruncated() {
        assert_eq!(truncate_preview("Hi there"), "Hi there");
        let exactly_fifty = "a".repeat(50);
        assert_eq!(truncate_preview(&exactly_fifty), exactly_fifty);
    }

    #[test]
    fn long_bodies_are_cut_at_fifty_chars_with_ellipsis() {
        let body = "b".repeat(80);
        let preview = truncate_preview(&body);
        assert_eq!(preview.chars().count(), 51);
        assert!(preview.ends_with('…'));
        assert!(preview.starts_with(&"b".repeat(50)));
    }

    #[test]
    fn truncation_respects_multibyte_chars() {
        let body = "é".repeat(60);
        let preview = truncate_preview(&body);
        assert_eq!(preview.chars().count(), 51);
        assert!(preview.ends_with('…'));
    }
}
