use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use domain::{ChatMessage, RoomId, UserId};

use crate::{error::ApiError, socket, state::AppState};

#[derive(Debug, Deserialize)]
struct SendMessagePayload {
    sender_id: UserId,
    content: String,
    chat_id: RoomId,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(socket::websocket_upgrade))
        .route("/api/message", post(create_message))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// 创建消息
///
/// 只负责持久化并返回带成员列表的消息；向房间和成员连接的推送由客户端
/// 拿到返回值后通过 WebSocket 的 `send message` 事件触发。
async fn create_message(
    State(state): State<AppState>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::bad_request("message content must not be empty"));
    }

    let message = state
        .persistence
        .create(payload.sender_id, payload.content, payload.chat_id)
        .await
        .map_err(application::ApplicationError::from)?;

    Ok((StatusCode::CREATED, Json(message)))
}
