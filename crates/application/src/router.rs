//! 事件路由器
//!
//! 每个入站事件都是一次无状态转移：基于注册表和订阅表的当前快照计算
//! 送达集合，先完成状态变更，再在锁外逐条推送。消息分发是两层的：
//! `received` 广播给正在订阅房间的连接（打开着会话视图的客户端），
//! `new message` 推给会话每个非发送者成员的全部连接（跨会话的未读
//! 提醒）。同一用户可能两层都收到，去重由展示层按消息 `_id` 处理。

use std::sync::Arc;

use tracing::{debug, warn};

use domain::{
    ChatMessage, ClientEvent, ConnectionId, ConnectionRegistry, DeliveryError, DeliveryTransport,
    RoomId, RoomTracker, ServerEvent, TypingNotice, UserProfile,
};

use crate::error::ApplicationError;

/// 计算好的单条送达
enum Delivery {
    ToConnection {
        connection_id: ConnectionId,
        event: ServerEvent,
    },
    ToRoom {
        room_id: RoomId,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    },
}

/// 入站事件的路由器
pub struct EventRouter {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomTracker>,
    transport: Arc<dyn DeliveryTransport>,
}

impl EventRouter {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        rooms: Arc<dyn RoomTracker>,
        transport: Arc<dyn DeliveryTransport>,
    ) -> Self {
        Self {
            registry,
            rooms,
            transport,
        }
    }

    /// 处理一条入站事件
    ///
    /// 只有绑定冲突会作为错误返回（连接保持可用，动作未生效）；格式
    /// 错误的负载丢弃并记日志，未知房间 / 用户按零接收方处理。
    pub async fn handle_event(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), ApplicationError> {
        debug!("Handling '{}' from connection {}", event.name(), connection_id);

        let deliveries = match event {
            ClientEvent::Setup(user) => self.handle_setup(connection_id, user).await?,
            ClientEvent::JoinRoom(room_id) => self.handle_join(connection_id, room_id).await,
            ClientEvent::LeaveRoom(room_id) => {
                self.rooms.leave(&room_id, connection_id).await;
                Vec::new()
            }
            ClientEvent::Typing(notice) => {
                self.handle_typing(connection_id, notice, false).await
            }
            ClientEvent::StopTyping(notice) => {
                self.handle_typing(connection_id, notice, true).await
            }
            ClientEvent::SendMessage(message) => {
                self.handle_send_message(connection_id, message).await
            }
        };

        self.dispatch(deliveries).await;
        Ok(())
    }

    /// 传输层拆除路径：把连接从注册表和所有房间清除
    ///
    /// 这是连接一次性离开所有房间的唯一出口，客户端断开前不需要逐个
    /// 发送 leave。
    pub async fn handle_disconnect(&self, connection_id: ConnectionId) {
        self.registry.remove(connection_id).await;
        self.rooms.purge_connection(connection_id).await;
        debug!("Connection {} torn down", connection_id);
    }

    async fn handle_setup(
        &self,
        connection_id: ConnectionId,
        user: UserProfile,
    ) -> Result<Vec<Delivery>, ApplicationError> {
        self.registry.bind(connection_id, user.id.clone()).await?;

        Ok(vec![Delivery::ToConnection {
            connection_id,
            event: ServerEvent::Connected,
        }])
    }

    async fn handle_join(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
    ) -> Vec<Delivery> {
        if self.registry.owner_of(connection_id).await.is_none() {
            warn!(
                "Connection {} tried to join room {} before setup, dropping",
                connection_id, room_id
            );
            return Vec::new();
        }

        self.rooms.join(room_id, connection_id).await;
        Vec::new()
    }

    async fn handle_typing(
        &self,
        connection_id: ConnectionId,
        notice: TypingNotice,
        stopped: bool,
    ) -> Vec<Delivery> {
        if self.registry.owner_of(connection_id).await.is_none() {
            warn!(
                "Typing event from unbound connection {}, dropping",
                connection_id
            );
            return Vec::new();
        }

        let event = if stopped {
            ServerEvent::StopTyping(notice.user)
        } else {
            ServerEvent::Typing(notice.user)
        };

        vec![Delivery::ToRoom {
            room_id: notice.chat,
            event,
            exclude: Some(connection_id),
        }]
    }

    async fn handle_send_message(
        &self,
        connection_id: ConnectionId,
        message: ChatMessage,
    ) -> Vec<Delivery> {
        // 防御空成员列表的畸形负载：丢弃，不报错
        if message.chat.users.is_empty() {
            warn!(
                "send message for chat {} carries no users, dropping",
                message.chat.id
            );
            return Vec::new();
        }

        let mut deliveries = Vec::new();

        // 第一层：房间广播，覆盖正在查看会话的连接，排除发送连接
        deliveries.push(Delivery::ToRoom {
            room_id: message.chat.id.clone(),
            event: ServerEvent::Received(message.clone()),
            exclude: Some(connection_id),
        });

        // 第二层：个人通知，发给每个非发送者成员的全部活跃连接，
        // 与房间订阅无关
        for member in &message.chat.users {
            if member.id == message.sender.id {
                continue;
            }
            for target in self.registry.connections_of(&member.id).await {
                deliveries.push(Delivery::ToConnection {
                    connection_id: target,
                    event: ServerEvent::NewMessage(message.clone()),
                });
            }
        }

        deliveries
    }

    async fn dispatch(&self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            match delivery {
                Delivery::ToConnection {
                    connection_id,
                    event,
                } => {
                    // 单个连接的失败按尽力而为吞掉，不影响其余送达
                    if let Err(err) = self.transport.emit_to_connection(connection_id, event).await
                    {
                        warn!("Emit to connection {} failed: {}", connection_id, err);
                    }
                }
                Delivery::ToRoom {
                    room_id,
                    event,
                    exclude,
                } => {
                    self.transport.emit_to_room(&room_id, event, exclude).await;
                }
            }
        }
    }
}
