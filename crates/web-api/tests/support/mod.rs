use std::sync::Arc;

use application::EventRouter;
use axum::Router;
use infrastructure::{
    ChannelTransport, InMemoryConnectionRegistry, InMemoryMembershipDirectory,
    InMemoryMessageStore, InMemoryRoomTracker,
};
use web_api::{router, AppState};

/// 组装一套全内存的网关路由，返回成员目录便于用例预置会话
pub fn build_app() -> (Router, Arc<InMemoryMembershipDirectory>) {
    let registry = Arc::new(InMemoryConnectionRegistry::new());
    let rooms = Arc::new(InMemoryRoomTracker::new());
    let transport = Arc::new(ChannelTransport::new(rooms.clone()));
    let event_router = Arc::new(EventRouter::new(registry, rooms, transport.clone()));
    let directory = Arc::new(InMemoryMembershipDirectory::new());
    let store = Arc::new(InMemoryMessageStore::new(directory.clone()));

    let app = router(AppState::new(event_router, transport, store));
    (app, directory)
}
