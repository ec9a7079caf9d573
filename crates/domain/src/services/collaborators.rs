//! 外部协作方接口
//!
//! 会话成员关系和消息持久化都不属于分发核心，核心只消费这两个接口。
//! 成员列表在每次调用时取当前值，核心不做缓存（时效窗口 = 单次请求）。

use async_trait::async_trait;

use crate::entities::{ChatMessage, UserProfile};
use crate::errors::PersistenceError;
use crate::value_objects::{RoomId, UserId};

/// 会话成员关系查询
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MembershipLookup: Send + Sync {
    /// 会话的成员列表；未知会话返回空序列而非错误
    async fn users_of(&self, chat_id: &RoomId) -> Vec<UserProfile>;
}

/// 消息持久化
///
/// 在路由分发之前调用；返回的消息带有填充好的 `chat.users`（来自成员
/// 关系查询的即时结果）。
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MessagePersistence: Send + Sync {
    async fn create(
        &self,
        sender: UserId,
        content: String,
        chat_id: RoomId,
    ) -> Result<ChatMessage, PersistenceError>;
}
