//! 协作方的内存实现
//!
//! 成员关系目录和消息存储在真实部署里属于持久化服务，这里提供单进程
//! 可运行的内存版本，供二进制和测试使用。消息创建时按当下的目录内容
//! 填充 `chat.users`，与原服务在持久化层 populate 成员列表的行为一致。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use domain::{
    ChatMessage, ChatSummary, MembershipLookup, MessagePersistence, PersistenceError, RoomId,
    UserId, UserProfile,
};

/// 内存会话成员目录
pub struct InMemoryMembershipDirectory {
    chats: RwLock<HashMap<RoomId, ChatSummary>>,
}

impl InMemoryMembershipDirectory {
    pub fn new() -> Self {
        Self {
            chats: RwLock::new(HashMap::new()),
        }
    }

    /// 登记或更新一个会话（成员变更走同一入口）
    pub async fn upsert_chat(&self, chat: ChatSummary) {
        let mut chats = self.chats.write().await;
        chats.insert(chat.id.clone(), chat);
    }

    /// 会话摘要的当前快照
    pub async fn chat(&self, chat_id: &RoomId) -> Option<ChatSummary> {
        let chats = self.chats.read().await;
        chats.get(chat_id).cloned()
    }
}

impl Default for InMemoryMembershipDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MembershipLookup for InMemoryMembershipDirectory {
    async fn users_of(&self, chat_id: &RoomId) -> Vec<UserProfile> {
        let chats = self.chats.read().await;
        chats
            .get(chat_id)
            .map(|chat| chat.users.clone())
            .unwrap_or_default()
    }
}

/// 内存消息存储
pub struct InMemoryMessageStore {
    directory: Arc<InMemoryMembershipDirectory>,
    messages: RwLock<Vec<ChatMessage>>,
}

impl InMemoryMessageStore {
    pub fn new(directory: Arc<InMemoryMembershipDirectory>) -> Self {
        Self {
            directory,
            messages: RwLock::new(Vec::new()),
        }
    }

    /// 已持久化的消息数（测试用）
    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }
}

#[async_trait]
impl MessagePersistence for InMemoryMessageStore {
    async fn create(
        &self,
        sender: UserId,
        content: String,
        chat_id: RoomId,
    ) -> Result<ChatMessage, PersistenceError> {
        let chat = self
            .directory
            .chat(&chat_id)
            .await
            .ok_or_else(|| PersistenceError::ChatNotFound(chat_id.clone()))?;

        // 发送者展示信息从成员列表解析，不在列表中也不拒绝（成员数据
        // 与消息创建之间允许竞态）
        let sender_profile = chat
            .users
            .iter()
            .find(|user| user.id == sender)
            .cloned()
            .unwrap_or_else(|| UserProfile::new(sender.clone()));

        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            sender: sender_profile,
            content,
            chat,
            created_at: Some(Utc::now()),
        };

        let mut messages = self.messages.write().await;
        messages.push(message.clone());

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_with_users(id: &str, users: &[&str]) -> ChatSummary {
        let mut chat = ChatSummary::new(id);
        chat.users = users.iter().map(|u| UserProfile::new(*u)).collect();
        chat
    }

    #[tokio::test]
    async fn unknown_chat_has_no_members() {
        let directory = InMemoryMembershipDirectory::new();
        assert!(directory.users_of(&RoomId::new("nope")).await.is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_member_list() {
        let directory = InMemoryMembershipDirectory::new();
        directory.upsert_chat(chat_with_users("r1", &["u1", "u2"])).await;
        directory.upsert_chat(chat_with_users("r1", &["u1", "u3"])).await;

        let users = directory.users_of(&RoomId::new("r1")).await;
        let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u3"]);
    }

    #[tokio::test]
    async fn create_populates_chat_users() {
        let directory = Arc::new(InMemoryMembershipDirectory::new());
        directory.upsert_chat(chat_with_users("r1", &["u1", "u2"])).await;
        let store = InMemoryMessageStore::new(directory);

        let message = store
            .create(UserId::new("u2"), "hello".to_string(), RoomId::new("r1"))
            .await
            .unwrap();

        assert_eq!(message.chat.users.len(), 2);
        assert_eq!(message.sender.id, UserId::new("u2"));
        assert!(message.created_at.is_some());
        assert_eq!(store.message_count().await, 1);
    }

    #[tokio::test]
    async fn create_for_unknown_chat_fails() {
        let directory = Arc::new(InMemoryMembershipDirectory::new());
        let store = InMemoryMessageStore::new(directory);

        let err = store
            .create(UserId::new("u1"), "hi".to_string(), RoomId::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::ChatNotFound(_)));
    }
}
