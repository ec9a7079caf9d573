//! 服务端出站事件
//!
//! 与入站事件共用 `{"event", "data"}` 信封。`typing` / `stop typing` 原样
//! 回显输入方的展示信息；`received` 走房间广播，`new message` 走按用户的
//! 个人通知，两者可以对同一用户重复送达，由展示层按消息 `_id` 去重。

use serde::{Deserialize, Serialize};

use crate::entities::ChatMessage;
use crate::errors::DeliveryError;

/// 推送给客户端的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// setup 完成的确认，只发给发起连接
    #[serde(rename = "connected")]
    Connected,
    /// 房间内其他人正在输入
    #[serde(rename = "typing")]
    Typing(serde_json::Value),
    /// 房间内其他人停止输入
    #[serde(rename = "stop typing")]
    StopTyping(serde_json::Value),
    /// 新消息（房间层，发给正在查看会话的订阅者）
    #[serde(rename = "received")]
    Received(ChatMessage),
    /// 新消息（个人层，发给会话成员的全部连接）
    #[serde(rename = "new message")]
    NewMessage(ChatMessage),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected => "connected",
            ServerEvent::Typing(_) => "typing",
            ServerEvent::StopTyping(_) => "stop typing",
            ServerEvent::Received(_) => "received",
            ServerEvent::NewMessage(_) => "new message",
        }
    }

    pub fn to_json(&self) -> Result<String, DeliveryError> {
        serde_json::to_string(self).map_err(|e| DeliveryError::MalformedEvent(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, DeliveryError> {
        serde_json::from_str(json).map_err(|e| DeliveryError::MalformedEvent(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn connected_has_no_payload() {
        let json = ServerEvent::Connected.to_json().unwrap();
        assert_eq!(json, r#"{"event":"connected"}"#);
    }

    #[test]
    fn typing_echo_keeps_user_info() {
        let event = ServerEvent::Typing(json!({"_id": "u1", "name": "alice"}));
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value["event"], "typing");
        assert_eq!(value["data"]["name"], "alice");
    }

    #[test]
    fn received_and_new_message_use_distinct_names() {
        let message: ChatMessage = serde_json::from_value(json!({
            "_id": "m1",
            "sender": {"_id": "u2"},
            "content": "hi",
            "chat": {"_id": "r1", "users": []}
        }))
        .unwrap();

        let received: serde_json::Value =
            serde_json::from_str(&ServerEvent::Received(message.clone()).to_json().unwrap())
                .unwrap();
        let personal: serde_json::Value =
            serde_json::from_str(&ServerEvent::NewMessage(message).to_json().unwrap()).unwrap();

        assert_eq!(received["event"], "received");
        assert_eq!(personal["event"], "new message");
        assert_eq!(received["data"]["_id"], personal["data"]["_id"]);
    }
}
