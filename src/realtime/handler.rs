use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    middleware::AuthUser,
    state::AppState,
};

use super::types::RealtimeEvent;

/// WebSocket upgrade for the caller's push channel
#[utoipa::path(
    get,
    path = "/api/ws",
    tag = "realtime",
    responses(
        (status = 101, description = "Switching to WebSocket"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response> {
    let profile = state
        .profile_repository
        .find_by_user_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, profile.id, state)))
}

/// Pump events from the registry channel out to the socket. The channel is
/// push-only: inbound client frames are drained and dropped, since all
/// writes go through the REST endpoints.
async fn handle_socket(socket: WebSocket, profile_id: Uuid, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<RealtimeEvent>();

    state.registry.register(profile_id, tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&event) {
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    let mut drain_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => drain_task.abort(),
        _ = &mut drain_task => send_task.abort(),
    }

    state.registry.remove(&profile_id);
}
