//! Web API 层。
//!
//! 提供 Axum 路由，把 WebSocket 事件交给应用层的事件路由器，把消息
//! 创建请求交给持久化协作方。

mod error;
mod routes;
mod socket;
mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
