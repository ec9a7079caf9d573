//! 基于 channel 的推送通道
//!
//! 每个连接在接入时注册一个无界 mpsc 发送端，socket 任务持有接收端。
//! 房间广播先向订阅表取快照，再逐个推送；单个接收方失败只记日志，
//! 不会中断剩余接收方，也不会反压到路由决策。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use domain::{ConnectionId, DeliveryError, DeliveryTransport, RoomId, RoomTracker, ServerEvent};

/// 内存 channel 实现的推送通道
pub struct ChannelTransport {
    /// 连接发送器映射
    senders: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>>>,
    /// 房间订阅解析
    rooms: Arc<dyn RoomTracker>,
}

impl ChannelTransport {
    pub fn new(rooms: Arc<dyn RoomTracker>) -> Self {
        Self {
            senders: Arc::new(RwLock::new(HashMap::new())),
            rooms,
        }
    }

    /// 注册连接发送器（socket 接入路径调用）
    pub async fn register_sender(
        &self,
        connection_id: ConnectionId,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) {
        let mut senders = self.senders.write().await;
        senders.insert(connection_id, sender);
    }

    /// 注销连接发送器（socket 拆除路径调用）
    pub async fn unregister_sender(&self, connection_id: ConnectionId) {
        let mut senders = self.senders.write().await;
        senders.remove(&connection_id);
    }
}

#[async_trait]
impl DeliveryTransport for ChannelTransport {
    async fn emit_to_connection(
        &self,
        connection_id: ConnectionId,
        event: ServerEvent,
    ) -> Result<(), DeliveryError> {
        let senders = self.senders.read().await;
        let sender = senders
            .get(&connection_id)
            .ok_or(DeliveryError::ConnectionClosed(connection_id))?;

        sender
            .send(event)
            .map_err(|_| DeliveryError::SendFailed(connection_id))?;

        debug!("Event routed to connection {}", connection_id);
        Ok(())
    }

    async fn emit_to_room(
        &self,
        room_id: &RoomId,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    ) {
        // 快照在前，推送在后，慢接收方不会拖住订阅表
        let subscribers = self.rooms.subscribers(room_id).await;

        let senders = self.senders.read().await;
        let mut failed_count = 0;
        for connection_id in subscribers {
            if Some(connection_id) == exclude {
                continue;
            }
            match senders.get(&connection_id) {
                Some(sender) if sender.send(event.clone()).is_ok() => {}
                _ => {
                    // 订阅表和发送器表之间允许短暂竞态，按尽力而为丢弃
                    failed_count += 1;
                    warn!("Failed to emit to connection {}", connection_id);
                }
            }
        }

        if failed_count > 0 {
            warn!(
                "Room {} broadcast failed for {} connection(s)",
                room_id, failed_count
            );
        }
    }
}
