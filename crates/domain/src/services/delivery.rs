//! 分发核心服务接口
//!
//! 定义连接注册表、房间订阅表和推送通道三个接口。实现方负责各自表内的
//! 互斥，接口层面的查询都返回快照，调用方在锁外完成推送。

use async_trait::async_trait;

use crate::errors::DeliveryError;
use crate::events::ServerEvent;
use crate::value_objects::{ConnectionId, RoomId, UserId};

/// 连接注册表：用户身份到活跃连接集合的映射
///
/// 一个用户可以同时持有多个连接（多标签页），一个连接至多绑定一个用户。
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 绑定连接到用户；同一身份重复绑定是幂等的，改绑其他身份返回
    /// [`DeliveryError::AlreadyBound`]
    async fn bind(&self, connection_id: ConnectionId, user_id: UserId)
        -> Result<(), DeliveryError>;

    /// 用户当前所有活跃连接的快照，可能为空
    async fn connections_of(&self, user_id: &UserId) -> Vec<ConnectionId>;

    /// 连接当前绑定的用户；未绑定返回 `None`
    async fn owner_of(&self, connection_id: ConnectionId) -> Option<UserId>;

    /// 连接断开时从索引中清除；未绑定的连接是静默 no-op
    async fn remove(&self, connection_id: ConnectionId);
}

/// 房间订阅表：会话 id 到已订阅连接集合的映射
///
/// 订阅以连接为粒度，房间在首次 join 时隐式出现，清空后即不再存在。
#[async_trait]
pub trait RoomTracker: Send + Sync {
    /// 订阅房间；幂等
    async fn join(&self, room_id: RoomId, connection_id: ConnectionId);

    /// 退订房间；不在房间内时是静默 no-op
    async fn leave(&self, room_id: &RoomId, connection_id: ConnectionId);

    /// 当前订阅者快照；未知房间返回空集而非错误
    async fn subscribers(&self, room_id: &RoomId) -> Vec<ConnectionId>;

    /// 把连接从它加入过的所有房间移除（断开路径的唯一批量出口）
    async fn purge_connection(&self, connection_id: ConnectionId);
}

/// 推送通道：核心只通过这两个调用向客户端送达事件
///
/// 每次调用至多尝试一次送达，不重试、不缓冲；慢接收方由底层通道的缓冲
/// 策略兜底，不会反压到路由决策。
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// 推送到单个连接
    async fn emit_to_connection(
        &self,
        connection_id: ConnectionId,
        event: ServerEvent,
    ) -> Result<(), DeliveryError>;

    /// 推送到房间全部订阅者，可排除一个连接（通常是发送者自己）。
    /// 单个接收方的失败不会中断对其余接收方的推送。
    async fn emit_to_room(
        &self,
        room_id: &RoomId,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    );
}
