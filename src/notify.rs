use dashmap::DashMap;
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::model::Event;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for post-commit events, keyed by room type. The email and
/// chat collaborators subscribe here; a send with no listeners (or a lagging
/// listener) is silently dropped; notification failure never reaches the
/// booking path.
pub struct NotifyHub {
    channels: DashMap<Ulid, broadcast::Sender<Event>>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self { channels: DashMap::new() }
    }

    /// Subscribe to events for a room type. Creates the channel if needed.
    pub fn subscribe(&self, room_type_id: Ulid) -> broadcast::Receiver<Event> {
        let sender = self
            .channels
            .entry(room_type_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Fire-and-forget publish. No-op if nobody is listening.
    pub fn send(&self, room_type_id: Ulid, event: &Event) {
        if let Some(sender) = self.channels.get(&room_type_id) {
            let _ = sender.send(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribe_and_receive() {
        let hub = NotifyHub::new();
        let rt = Ulid::new();
        let mut rx = hub.subscribe(rt);

        let event = Event::RoomTypeCreated { id: rt, name: "Deluxe Sea View".into() };
        hub.send(rt, &event);

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn send_without_subscribers_is_noop() {
        let hub = NotifyHub::new();
        let rt = Ulid::new();
        hub.send(rt, &Event::RoomTypeCreated { id: rt, name: "Suite".into() });
    }
}
