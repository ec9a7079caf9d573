//! 分发核心错误定义

use thiserror::Error;

use crate::value_objects::{ConnectionId, RoomId, UserId};

/// 分发核心错误类型
///
/// 没有任何一个错误会导致进程退出：绑定冲突回给调用方，格式错误的事件
/// 丢弃并记录日志，发送失败按接收方各自吞掉。
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryError {
    /// 连接已绑定到另一个用户，拒绝改绑
    #[error("connection {connection_id} already bound to user {bound_to}")]
    AlreadyBound {
        connection_id: ConnectionId,
        bound_to: UserId,
    },

    /// 事件负载缺少必需字段
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// 向单个连接推送失败
    #[error("failed to send to connection {0}")]
    SendFailed(ConnectionId),

    /// 连接已关闭或从未注册
    #[error("connection closed: {0}")]
    ConnectionClosed(ConnectionId),
}

/// 持久化协作方错误
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PersistenceError {
    /// 目标会话不存在
    #[error("chat not found: {0}")]
    ChatNotFound(RoomId),

    /// 底层存储错误
    #[error("storage error: {0}")]
    Storage(String),
}
