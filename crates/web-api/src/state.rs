use std::sync::Arc;

use application::EventRouter;
use domain::MessagePersistence;
use infrastructure::ChannelTransport;

/// 路由共享状态
///
/// 推送通道保留具体类型，socket 接入和拆除需要它的注册接口。
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<EventRouter>,
    pub transport: Arc<ChannelTransport>,
    pub persistence: Arc<dyn MessagePersistence>,
}

impl AppState {
    pub fn new(
        router: Arc<EventRouter>,
        transport: Arc<ChannelTransport>,
        persistence: Arc<dyn MessagePersistence>,
    ) -> Self {
        Self {
            router,
            transport,
            persistence,
        }
    }
}
