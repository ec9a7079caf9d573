//! 客户端入站事件
//!
//! 线路格式为 `{"event": <名称>, "data": <负载>}`，事件名与原客户端约定
//! 一致（含空格），不能改动。

use serde::{Deserialize, Serialize};

use crate::entities::{ChatMessage, TypingNotice, UserProfile};
use crate::errors::DeliveryError;
use crate::value_objects::RoomId;

/// 客户端发来的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// 绑定连接到用户身份
    #[serde(rename = "setup")]
    Setup(UserProfile),
    /// 订阅房间
    #[serde(rename = "join room")]
    JoinRoom(RoomId),
    /// 退订房间
    #[serde(rename = "leave room")]
    LeaveRoom(RoomId),
    /// 正在输入
    #[serde(rename = "typing")]
    Typing(TypingNotice),
    /// 停止输入
    #[serde(rename = "stop typing")]
    StopTyping(TypingNotice),
    /// 已持久化消息的分发请求
    #[serde(rename = "send message")]
    SendMessage(ChatMessage),
}

impl ClientEvent {
    /// 事件名（用于日志）
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Setup(_) => "setup",
            ClientEvent::JoinRoom(_) => "join room",
            ClientEvent::LeaveRoom(_) => "leave room",
            ClientEvent::Typing(_) => "typing",
            ClientEvent::StopTyping(_) => "stop typing",
            ClientEvent::SendMessage(_) => "send message",
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DeliveryError> {
        serde_json::from_str(json).map_err(|e| DeliveryError::MalformedEvent(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, DeliveryError> {
        serde_json::to_string(self).map_err(|e| DeliveryError::MalformedEvent(e.to_string()))
    }
}
