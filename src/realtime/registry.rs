use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::types::RealtimeEvent;

pub type EventSender = mpsc::UnboundedSender<RealtimeEvent>;

/// Live WebSocket connections keyed by profile id. Carried in `AppState`
/// and handed to whichever handler needs to push; never a process global.
#[derive(Clone)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<Uuid, EventSender>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
        }
    }

    pub fn register(&self, profile_id: Uuid, sender: EventSender) {
        self.connections.insert(profile_id, sender);
        tracing::info!("Profile {} connected via WebSocket", profile_id);
    }

    pub fn remove(&self, profile_id: &Uuid) {
        self.connections.remove(profile_id);
        tracing::info!("Profile {} disconnected from WebSocket", profile_id);
    }

    /// Fire-and-forget push. Returns whether a live channel accepted the
    /// event; callers on the REST path ignore the answer.
    pub fn send_to_user(&self, profile_id: &Uuid, event: RealtimeEvent) -> bool {
        if let Some(sender) = self.connections.get(profile_id) {
            sender.send(event).is_ok()
        } else {
            false
        }
    }

    pub fn online_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::types::MessagesReadPayload;

    fn read_event() -> RealtimeEvent {
        RealtimeEvent::MessagesRead(MessagesReadPayload {
            conversation_id: Uuid::new_v4(),
            reader_id: Uuid::new_v4(),
            message_ids: vec![],
        })
    }

    #[test]
    fn delivers_to_a_registered_profile() {
        let registry = ConnectionRegistry::new();
        let profile_id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();

        registry.register(profile_id, tx);
        assert!(registry.send_to_user(&profile_id, read_event()));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn send_to_absent_profile_is_a_no_op() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.send_to_user(&Uuid::new_v4(), read_event()));
    }

    #[test]
    fn removed_profiles_stop_receiving() {
        let registry = ConnectionRegistry::new();
        let profile_id = Uuid::new_v4();
        let (tx, _rx) = mpsc::unbounded_channel();

        registry.register(profile_id, tx);
        assert_eq!(registry.online_count(), 1);

        registry.remove(&profile_id);
        assert_eq!(registry.online_count(), 0);
        assert!(!registry.send_to_user(&profile_id, read_event()));
    }
}
