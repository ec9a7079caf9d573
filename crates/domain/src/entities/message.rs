//! 消息与会话实体
//!
//! 字段名与原始持久化记录保持一致（Mongo 风格：`_id`、`chatName`、
//! `createdAt`），保证与既有客户端的互操作。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{RoomId, UserId};

/// 用户展示信息
///
/// `setup` 事件和 `chat.users[]` 携带的用户对象，`_id` 之外的字段都是
/// 展示用途，缺省即可。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserProfile {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            pic: None,
            email: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// 会话摘要（消息内嵌的 chat 对象）
///
/// `users` 是持久化协作方在创建消息时填充的成员列表，个人通知（tier-2）
/// 的目标即来自这里。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    #[serde(rename = "_id")]
    pub id: RoomId,
    #[serde(rename = "chatName", default, skip_serializing_if = "Option::is_none")]
    pub chat_name: Option<String>,
    #[serde(rename = "isGroupChat", default)]
    pub is_group_chat: bool,
    #[serde(default)]
    pub users: Vec<UserProfile>,
}

impl ChatSummary {
    pub fn new(id: impl Into<RoomId>) -> Self {
        Self {
            id: id.into(),
            chat_name: None,
            is_group_chat: false,
            users: Vec::new(),
        }
    }
}

/// 完整消息对象
///
/// 分发核心不创建消息，只路由持久化协作方返回的对象。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub sender: UserProfile,
    pub content: String,
    pub chat: ChatSummary,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// 输入中的 typing / stop typing 负载：`{"chat": roomId, "user": displayInfo}`
///
/// `user` 原样回显给房间内其他订阅者，核心不解析其内容。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingNotice {
    pub chat: RoomId,
    pub user: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_uses_wire_field_names() {
        let raw = json!({
            "_id": "m1",
            "sender": {"_id": "u2", "name": "bob", "pic": "b.png"},
            "content": "hi",
            "chat": {
                "_id": "r1",
                "chatName": "general",
                "isGroupChat": true,
                "users": [{"_id": "u1"}, {"_id": "u2"}]
            },
            "createdAt": "2024-05-01T12:00:00Z"
        });

        let message: ChatMessage = serde_json::from_value(raw).unwrap();
        assert_eq!(message.id, "m1");
        assert_eq!(message.sender.id, UserId::new("u2"));
        assert_eq!(message.chat.id, RoomId::new("r1"));
        assert!(message.chat.is_group_chat);
        assert_eq!(message.chat.users.len(), 2);
        assert!(message.created_at.is_some());

        let back = serde_json::to_value(&message).unwrap();
        assert_eq!(back["chat"]["chatName"], "general");
        assert_eq!(back["sender"]["_id"], "u2");
    }

    #[test]
    fn chat_users_default_to_empty() {
        let raw = json!({"_id": "r9"});
        let chat: ChatSummary = serde_json::from_value(raw).unwrap();
        assert!(chat.users.is_empty());
        assert!(!chat.is_group_chat);
    }
}
