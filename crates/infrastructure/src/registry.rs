//! 内存连接注册表
//!
//! 正向索引（连接 → 用户）加反向索引（用户 → 连接集合），两把锁固定
//! 顺序获取，保证绑定 / 清除对后续路由决策是原子的。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use domain::{ConnectionId, ConnectionRegistry, DeliveryError, UserId};

/// 内存实现的连接注册表
pub struct InMemoryConnectionRegistry {
    /// 连接到所属用户的映射
    owners: Arc<RwLock<HashMap<ConnectionId, UserId>>>,
    /// 用户到连接集合的映射
    user_connections: Arc<RwLock<HashMap<UserId, HashSet<ConnectionId>>>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self {
            owners: Arc::new(RwLock::new(HashMap::new())),
            user_connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn bind(
        &self,
        connection_id: ConnectionId,
        user_id: UserId,
    ) -> Result<(), DeliveryError> {
        // 锁顺序：owners 先于 user_connections
        let mut owners = self.owners.write().await;
        let mut user_connections = self.user_connections.write().await;

        if let Some(bound_to) = owners.get(&connection_id) {
            if *bound_to == user_id {
                debug!("Connection {} re-bound to same user", connection_id);
                return Ok(());
            }
            return Err(DeliveryError::AlreadyBound {
                connection_id,
                bound_to: bound_to.clone(),
            });
        }

        owners.insert(connection_id, user_id.clone());
        user_connections
            .entry(user_id.clone())
            .or_default()
            .insert(connection_id);

        info!("Connection {} bound to user {}", connection_id, user_id);
        Ok(())
    }

    async fn connections_of(&self, user_id: &UserId) -> Vec<ConnectionId> {
        let user_connections = self.user_connections.read().await;
        user_connections
            .get(user_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    async fn owner_of(&self, connection_id: ConnectionId) -> Option<UserId> {
        let owners = self.owners.read().await;
        owners.get(&connection_id).cloned()
    }

    async fn remove(&self, connection_id: ConnectionId) {
        let mut owners = self.owners.write().await;
        let mut user_connections = self.user_connections.write().await;

        let Some(user_id) = owners.remove(&connection_id) else {
            // 从未绑定的连接，无事可做
            return;
        };

        if let Some(connections) = user_connections.get_mut(&user_id) {
            connections.remove(&connection_id);
            if connections.is_empty() {
                user_connections.remove(&user_id);
            }
        }

        info!("Connection {} removed for user {}", connection_id, user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_then_lookup_then_remove() {
        let registry = InMemoryConnectionRegistry::new();
        let user = UserId::new("u1");
        let connection = ConnectionId::generate();

        registry.bind(connection, user.clone()).await.unwrap();
        assert_eq!(registry.connections_of(&user).await, vec![connection]);

        registry.remove(connection).await;
        assert!(registry.connections_of(&user).await.is_empty());
        assert!(registry.owner_of(connection).await.is_none());
    }

    #[tokio::test]
    async fn rebind_same_user_is_idempotent() {
        let registry = InMemoryConnectionRegistry::new();
        let user = UserId::new("u1");
        let connection = ConnectionId::generate();

        registry.bind(connection, user.clone()).await.unwrap();
        registry.bind(connection, user.clone()).await.unwrap();
        assert_eq!(registry.connections_of(&user).await.len(), 1);
    }

    #[tokio::test]
    async fn rebind_other_user_is_rejected() {
        let registry = InMemoryConnectionRegistry::new();
        let connection = ConnectionId::generate();

        registry.bind(connection, UserId::new("u1")).await.unwrap();
        let err = registry
            .bind(connection, UserId::new("u2"))
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::AlreadyBound { bound_to, .. } if bound_to == UserId::new("u1")));

        // 原有绑定保持不变
        assert_eq!(
            registry.owner_of(connection).await,
            Some(UserId::new("u1"))
        );
    }

    #[tokio::test]
    async fn remove_unknown_connection_is_noop() {
        let registry = InMemoryConnectionRegistry::new();
        registry.remove(ConnectionId::generate()).await;
    }

    #[tokio::test]
    async fn multiple_connections_per_user() {
        let registry = InMemoryConnectionRegistry::new();
        let user = UserId::new("u1");
        let c1 = ConnectionId::generate();
        let c2 = ConnectionId::generate();

        registry.bind(c1, user.clone()).await.unwrap();
        registry.bind(c2, user.clone()).await.unwrap();

        let mut connections = registry.connections_of(&user).await;
        connections.sort_by_key(|c| c.to_string());
        let mut expected = vec![c1, c2];
        expected.sort_by_key(|c| c.to_string());
        assert_eq!(connections, expected);

        // 移除一个连接不影响另一个
        registry.remove(c1).await;
        assert_eq!(registry.connections_of(&user).await, vec![c2]);
    }
}
