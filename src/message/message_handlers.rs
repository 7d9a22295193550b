use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::SuccessResponse,
    error::{AppError, Result},
    listing::{page_meta, page_offset},
    middleware::AuthUser,
    realtime::{MessagesReadPayload, NewMessagePayload, RealtimeEvent},
    state::AppState,
};

use super::{
    message_dto::{
        ConversationSummary, HistoryQuery, MarkReadRequest, MessageHistoryResponse,
        MessageResponse, ParticipantSummary, SendMessageRequest,
    },
    message_service::truncate_preview,
};

/// List the caller's conversations
#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "messages",
    responses(
        (status = 200, description = "Conversations, newest activity first", body = Vec<ConversationSummary>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_conversations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ConversationSummary>>> {
    let profile = state
        .profile_repository
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let conversations = state
        .message_repository
        .find_conversations_for(profile.id)
        .await?;

    Ok(Json(conversations))
}

/// Send a message, starting a conversation if needed
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "messages",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Created message", body = MessageResponse),
        (status = 400, description = "Invalid input or missing recipientId"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile, conversation or recipient not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<MessageResponse>> {
    let sender = state
        .profile_repository
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    payload.validate()?;

    let conversation_id = state
        .message_service
        .resolve_conversation(sender.id, &payload)
        .await?;

    let message = state
        .message_service
        .send_message(&sender, conversation_id, &payload)
        .await?;

    // The message is committed at this point; everything below is a
    // best-effort side channel and must never fail the request.
    match state
        .message_repository
        .other_participant(conversation_id, sender.id)
        .await
    {
        Ok(Some(recipient_id)) => {
            let title = format!("New message from {}", sender.display_name);
            if let Err(e) = state
                .notification_repository
                .create(
                    recipient_id,
                    &title,
                    &truncate_preview(&payload.content),
                    Some(conversation_id),
                )
                .await
            {
                tracing::warn!("Failed to persist notification: {:?}", e);
            }

            state.registry.send_to_user(
                &recipient_id,
                RealtimeEvent::NewMessage(NewMessagePayload {
                    conversation_id,
                    message_id: message.id,
                    sender_id: sender.id,
                    sender_display_name: sender.display_name.clone(),
                    content: message.content.clone(),
                    created_at: message.created_at,
                }),
            );
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Failed to resolve notification recipient: {:?}", e),
    }

    Ok(Json(message))
}

/// Mark every unread message in a conversation as read
#[utoipa::path(
    put,
    path = "/api/messages",
    tag = "messages",
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Conversation marked read", body = SuccessResponse),
        (status = 400, description = "Missing conversationId"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Conversation not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<MarkReadRequest>,
) -> Result<Json<SuccessResponse>> {
    let profile = state
        .profile_repository
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let conversation_id = payload
        .conversation_id
        .ok_or_else(|| AppError::BadRequest("conversationId is required".to_string()))?;

    if !state
        .message_repository
        .is_participant(conversation_id, profile.id)
        .await?
    {
        return Err(AppError::NotFound("Conversation not found".to_string()));
    }

    let message_ids = state
        .message_repository
        .mark_conversation_read(conversation_id, profile.id)
        .await?;

    // Nothing was unread: no writes happened, so no event goes out either.
    if !message_ids.is_empty() {
        match state
            .message_repository
            .other_participant(conversation_id, profile.id)
            .await
        {
            Ok(Some(other_id)) => {
                state.registry.send_to_user(
                    &other_id,
                    RealtimeEvent::MessagesRead(MessagesReadPayload {
                        conversation_id,
                        reader_id: profile.id,
                        message_ids,
                    }),
                );
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to resolve read-event recipient: {:?}", e),
        }
    }

    Ok(Json(SuccessResponse::ok()))
}

/// Page through a conversation's history, newest first
#[utoipa::path(
    get,
    path = "/api/messages/{conversationId}",
    tag = "messages",
    params(
        ("conversationId" = Uuid, Path, description = "Conversation id"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Page of messages", body = MessageHistoryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Conversation not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(conversation_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<MessageHistoryResponse>> {
    let profile = state
        .profile_repository
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    if !state
        .message_repository
        .is_participant(conversation_id, profile.id)
        .await?
    {
        return Err(AppError::NotFound("Conversation not found".to_string()));
    }

    let page = query.page.filter(|p| *p >= 1).unwrap_or(1);
    let limit = query.limit.filter(|l| *l >= 1).unwrap_or(50).min(100);
    let offset = page_offset(page, limit);

    let (messages, total) = state
        .message_repository
        .find_messages(conversation_id, limit as i64, offset)
        .await?;

    let message_ids: Vec<Uuid> = messages.iter().map(|m| m.id).collect();
    let receipts = state.message_repository.find_receipts(&message_ids).await?;

    let sender_ids: Vec<Uuid> = {
        let mut ids: Vec<Uuid> = messages.iter().map(|m| m.sender_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    let senders: HashMap<Uuid, ParticipantSummary> = state
        .message_repository
        .find_sender_summaries(&sender_ids)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let shaped: Vec<MessageResponse> = messages
        .into_iter()
        .map(|m| {
            let sender = senders.get(&m.sender_id).cloned().unwrap_or(ParticipantSummary {
                id: m.sender_id,
                display_name: String::new(),
                avatar_url: None,
            });
            let read_by = receipts
                .iter()
                .filter(|r| r.message_id == m.id)
                .map(Into::into)
                .collect();
            MessageResponse {
                id: m.id,
                conversation_id: m.conversation_id,
                sender,
                content: m.content,
                attachments: m.attachments,
                created_at: m.created_at,
                read_by,
            }
        })
        .collect();

    let (total_pages, has_more) = page_meta(total, page, limit);

    Ok(Json(MessageHistoryResponse {
        messages: shaped,
        total,
        page,
        total_pages,
        has_more,
    }))
}
