//! Room registry.
//!
//! A room exists while it has at least one member. Messages are forwarded
//! to every other member through bounded per-client queues; a full queue
//! drops the message for that client.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use axum::extract::ws::Message;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};

/// Messages buffered per client before forwarding starts dropping.
pub const SEND_QUEUE_CAPACITY: usize = 256;

type Room = HashMap<String, mpsc::Sender<Message>>;

/// Per-room member count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    pub room_id: String,
    pub client_count: usize,
}

/// Snapshot returned by `GET /stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStats {
    pub total_rooms: usize,
    pub total_clients: usize,
    pub rooms: Vec<RoomStats>,
}

/// All rooms, keyed by room id.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client to a room, creating the room if needed.
    pub fn join(&self, room_id: &str, client_id: &str) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_CAPACITY);
        let mut rooms = self.write();
        let room = rooms.entry(room_id.to_string()).or_insert_with(|| {
            info!(room = %room_id, "room created");
            HashMap::new()
        });
        room.insert(client_id.to_string(), tx);
        info!(room = %room_id, clients = room.len(), "room membership changed");
        rx
    }

    /// Remove a client. The room is deleted when its last member leaves.
    ///
    /// Returns the number of members left in the room.
    pub fn leave(&self, room_id: &str, client_id: &str) -> usize {
        let mut rooms = self.write();
        let Some(room) = rooms.get_mut(room_id) else {
            return 0;
        };
        room.remove(client_id);
        let remaining = room.len();
        info!(room = %room_id, clients = remaining, "room membership changed");
        if remaining == 0 {
            rooms.remove(room_id);
            info!(room = %room_id, "empty room removed");
        }
        remaining
    }

    /// Forward a message to every member of `room_id` except `exclude`.
    ///
    /// Returns the number of clients the message was queued for.
    pub fn broadcast(&self, room_id: &str, message: &Message, exclude: &str) -> usize {
        let rooms = self.read();
        let Some(room) = rooms.get(room_id) else {
            return 0;
        };

        let mut reached = 0;
        for (id, tx) in room.iter().filter(|(id, _)| id.as_str() != exclude) {
            match tx.try_send(message.clone()) {
                Ok(()) => reached += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(room = %room_id, client = %short_id(id), "send queue full, message dropped");
                }
                Err(TrySendError::Closed(_)) => {}
            }
        }
        reached
    }

    pub fn room_count(&self) -> usize {
        self.read().len()
    }

    pub fn client_count(&self, room_id: &str) -> usize {
        self.read().get(room_id).map_or(0, HashMap::len)
    }

    /// Room and member counts, rooms sorted by id.
    pub fn stats(&self) -> RelayStats {
        let rooms = self.read();
        let mut stats: Vec<RoomStats> = rooms
            .iter()
            .map(|(id, room)| RoomStats {
                room_id: id.clone(),
                client_count: room.len(),
            })
            .collect();
        stats.sort_by(|a, b| a.room_id.cmp(&b.room_id));

        RelayStats {
            total_rooms: stats.len(),
            total_clients: stats.iter().map(|r| r.client_count).sum(),
            rooms: stats,
        }
    }

    /// Drop every client and room. Closed queues end the write loops, which
    /// send a close frame.
    pub fn shutdown(&self) {
        let mut rooms = self.write();
        for (room_id, room) in rooms.drain() {
            info!(room = %room_id, clients = room.len(), "room closed");
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Room>> {
        self.rooms.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Room>> {
        self.rooms.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// First eight characters of a client id, for log lines.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooms_are_created_and_removed() {
        let registry = RoomRegistry::new();
        let _a = registry.join("room-1", "a");
        let _b = registry.join("room-1", "b");
        let _c = registry.join("room-2", "c");
        assert_eq!(registry.room_count(), 2);
        assert_eq!(registry.client_count("room-1"), 2);

        assert_eq!(registry.leave("room-2", "c"), 0);
        assert_eq!(registry.room_count(), 1);
        assert_eq!(registry.leave("room-1", "a"), 1);
        assert_eq!(registry.leave("missing", "x"), 0);
    }

    #[tokio::test]
    async fn test_broadcast_stays_in_room_and_skips_sender() {
        let registry = RoomRegistry::new();
        let mut a = registry.join("r", "a");
        let mut b = registry.join("r", "b");
        let mut other = registry.join("elsewhere", "c");

        let reached = registry.broadcast("r", &Message::Text("hi".into()), "a");
        assert_eq!(reached, 1);
        assert!(matches!(b.recv().await, Some(Message::Text(t)) if t.as_str() == "hi"));
        assert!(a.try_recv().is_err());
        assert!(other.try_recv().is_err());
    }

    #[test]
    fn test_full_queue_drops() {
        let registry = RoomRegistry::new();
        let _a = registry.join("r", "a");
        let _b = registry.join("r", "b");
        for _ in 0..SEND_QUEUE_CAPACITY {
            assert_eq!(
                registry.broadcast("r", &Message::Binary(vec![1].into()), "a"),
                1
            );
        }
        assert_eq!(
            registry.broadcast("r", &Message::Binary(vec![1].into()), "a"),
            0
        );
    }

    #[test]
    fn test_stats_shape() {
        let registry = RoomRegistry::new();
        let _a = registry.join("beta", "a");
        let _b = registry.join("alpha", "b");
        let _c = registry.join("alpha", "c");

        let stats = registry.stats();
        assert_eq!(stats.total_rooms, 2);
        assert_eq!(stats.total_clients, 3);
        assert_eq!(stats.rooms[0].room_id, "alpha");

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalClients"], 3);
        assert_eq!(json["rooms"][0]["roomId"], "alpha");
        assert_eq!(json["rooms"][0]["clientCount"], 2);
    }

    #[test]
    fn test_shutdown_clears_rooms() {
        let registry = RoomRegistry::new();
        let mut rx = registry.join("r", "a");
        registry.shutdown();
        assert_eq!(registry.room_count(), 0);
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
