//! 主应用程序入口
//!
//! 组装内存版分发核心并启动 Axum Web API 服务。

use std::sync::Arc;

use application::EventRouter;
use config::GatewayConfig;
use infrastructure::{
    ChannelTransport, InMemoryConnectionRegistry, InMemoryMembershipDirectory,
    InMemoryMessageStore, InMemoryRoomTracker,
};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = GatewayConfig::from_env_with_defaults();

    // 分发核心的三张表
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let rooms = Arc::new(InMemoryRoomTracker::new());
    let transport = Arc::new(ChannelTransport::new(rooms.clone()));
    let event_router = Arc::new(EventRouter::new(registry, rooms, transport.clone()));

    // 协作方：成员目录和消息存储的内存实现
    let directory = Arc::new(InMemoryMembershipDirectory::new());
    let store = Arc::new(InMemoryMessageStore::new(directory));

    let state = AppState::new(event_router, transport, store);

    // 启动 Web 服务器
    let app = router(state);
    let bind_addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("消息网关启动在 http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
