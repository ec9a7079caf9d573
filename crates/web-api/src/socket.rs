use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use domain::{ClientEvent, ConnectionId, ServerEvent};

use crate::state::AppState;

/// WebSocket 升级入口
pub async fn websocket_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// 单个连接的主循环
///
/// 写路径：推送通道注册的接收端 → 序列化 → socket；
/// 读路径：socket 文本帧 → 事件解析 → 事件路由器。
/// 任一侧结束即进入拆除流程。
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = ConnectionId::generate();
    info!("WebSocket 连接已建立: {}", connection_id);

    let (mut sink, mut stream) = socket.split();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
    state.transport.register_sender(connection_id, event_tx).await;

    // 发送任务：所有推送事件统一在这里写出
    let send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let payload = match event.to_json() {
                Ok(json) => json,
                Err(err) => {
                    warn!("Failed to serialize event '{}': {}", event.name(), err);
                    continue;
                }
            };
            if sink.send(WsMessage::Text(payload.into())).await.is_err() {
                break;
            }
        }
        debug!("WebSocket发送任务结束: {}", connection_id);
    });

    // 接收任务：解析失败只丢帧并记日志，不关闭连接
    let event_router = state.router.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(err) => {
                    debug!("WebSocket读取失败: {}: {}", connection_id, err);
                    break;
                }
            };
            match frame {
                WsMessage::Text(text) => match ClientEvent::from_json(&text) {
                    Ok(event) => {
                        if let Err(err) = event_router.handle_event(connection_id, event).await {
                            warn!("Event from connection {} failed: {}", connection_id, err);
                        }
                    }
                    Err(err) => {
                        warn!("Dropping unparseable frame from {}: {}", connection_id, err);
                    }
                },
                WsMessage::Close(_) => {
                    debug!("WebSocket收到关闭消息: {}", connection_id);
                    break;
                }
                // ping/pong 由底层协议栈应答，这里无需处理
                WsMessage::Ping(_) | WsMessage::Pong(_) => {}
                WsMessage::Binary(_) => {
                    debug!("忽略二进制帧: {}", connection_id);
                }
            }
        }
        debug!("WebSocket接收任务结束: {}", connection_id);
    });

    // 等待任意一个任务完成（连接断开）
    tokio::select! {
        _ = send_task => {}
        _ = recv_task => {}
    }

    // 先注销发送器，再清理绑定和订阅，保证后续路由决策看不到本连接
    state.transport.unregister_sender(connection_id).await;
    state.router.handle_disconnect(connection_id).await;
    info!("WebSocket 连接已拆除: {}", connection_id);
}
