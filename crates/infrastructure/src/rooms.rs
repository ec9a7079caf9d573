//! 内存房间订阅表
//!
//! 订阅以连接为粒度。反向索引（连接 → 房间集合）让断开时的批量清除
//! 只触达该连接加入过的房间。空房间随手删除，保持表的体积只和活跃
//! 订阅相关。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use domain::{ConnectionId, RoomId, RoomTracker};

/// 内存实现的房间订阅表
pub struct InMemoryRoomTracker {
    /// 房间到订阅连接集合的映射
    rooms: Arc<RwLock<HashMap<RoomId, HashSet<ConnectionId>>>>,
    /// 连接到已加入房间集合的映射
    joined: Arc<RwLock<HashMap<ConnectionId, HashSet<RoomId>>>>,
}

impl InMemoryRoomTracker {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            joined: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 当前存在订阅者的房间数（测试与观测用）
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

impl Default for InMemoryRoomTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomTracker for InMemoryRoomTracker {
    async fn join(&self, room_id: RoomId, connection_id: ConnectionId) {
        // 锁顺序：rooms 先于 joined
        let mut rooms = self.rooms.write().await;
        let mut joined = self.joined.write().await;

        rooms.entry(room_id.clone()).or_default().insert(connection_id);
        joined.entry(connection_id).or_default().insert(room_id.clone());

        info!("Connection {} joined room {}", connection_id, room_id);
    }

    async fn leave(&self, room_id: &RoomId, connection_id: ConnectionId) {
        let mut rooms = self.rooms.write().await;
        let mut joined = self.joined.write().await;

        if let Some(subscribers) = rooms.get_mut(room_id) {
            subscribers.remove(&connection_id);
            if subscribers.is_empty() {
                rooms.remove(room_id);
            }
        }

        if let Some(room_ids) = joined.get_mut(&connection_id) {
            room_ids.remove(room_id);
            if room_ids.is_empty() {
                joined.remove(&connection_id);
            }
        }

        info!("Connection {} left room {}", connection_id, room_id);
    }

    async fn subscribers(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let rooms = self.rooms.read().await;
        rooms
            .get(room_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    async fn purge_connection(&self, connection_id: ConnectionId) {
        let mut rooms = self.rooms.write().await;
        let mut joined = self.joined.write().await;

        let Some(room_ids) = joined.remove(&connection_id) else {
            return;
        };

        for room_id in &room_ids {
            if let Some(subscribers) = rooms.get_mut(room_id) {
                subscribers.remove(&connection_id);
                if subscribers.is_empty() {
                    rooms.remove(room_id);
                }
            }
        }

        info!(
            "Connection {} purged from {} room(s)",
            connection_id,
            room_ids.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_leave_round_trip() {
        let tracker = InMemoryRoomTracker::new();
        let room = RoomId::new("r1");
        let connection = ConnectionId::generate();

        let before = tracker.subscribers(&room).await;
        tracker.join(room.clone(), connection).await;
        tracker.leave(&room, connection).await;
        assert_eq!(tracker.subscribers(&room).await, before);
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let tracker = InMemoryRoomTracker::new();
        let room = RoomId::new("r1");
        let connection = ConnectionId::generate();

        tracker.join(room.clone(), connection).await;
        tracker.join(room.clone(), connection).await;
        assert_eq!(tracker.subscribers(&room).await.len(), 1);
    }

    #[tokio::test]
    async fn leave_absent_connection_is_noop() {
        let tracker = InMemoryRoomTracker::new();
        tracker
            .leave(&RoomId::new("r1"), ConnectionId::generate())
            .await;
        assert!(tracker.subscribers(&RoomId::new("r1")).await.is_empty());
    }

    #[tokio::test]
    async fn purge_removes_connection_from_every_room() {
        let tracker = InMemoryRoomTracker::new();
        let connection = ConnectionId::generate();
        let other = ConnectionId::generate();

        for name in ["a", "b", "c"] {
            tracker.join(RoomId::new(name), connection).await;
        }
        tracker.join(RoomId::new("b"), other).await;

        tracker.purge_connection(connection).await;

        for name in ["a", "b", "c"] {
            let subscribers = tracker.subscribers(&RoomId::new(name)).await;
            assert!(!subscribers.contains(&connection), "room {name}");
        }
        // 其他连接不受影响
        assert_eq!(tracker.subscribers(&RoomId::new("b")).await, vec![other]);
    }

    #[tokio::test]
    async fn empty_rooms_are_pruned() {
        let tracker = InMemoryRoomTracker::new();
        let room = RoomId::new("r1");
        let connection = ConnectionId::generate();

        tracker.join(room.clone(), connection).await;
        assert_eq!(tracker.room_count().await, 1);

        tracker.leave(&room, connection).await;
        assert_eq!(tracker.room_count().await, 0);
    }

    #[tokio::test]
    async fn tabs_subscribe_independently() {
        let tracker = InMemoryRoomTracker::new();
        let room = RoomId::new("r1");
        let tab1 = ConnectionId::generate();
        let tab2 = ConnectionId::generate();

        tracker.join(room.clone(), tab1).await;
        tracker.join(room.clone(), tab2).await;

        tracker.leave(&room, tab1).await;
        assert_eq!(tracker.subscribers(&room).await, vec![tab2]);
    }
}
