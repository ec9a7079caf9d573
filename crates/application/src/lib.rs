//! 应用层
//!
//! 事件路由器：把入站事件翻译成注册表 / 订阅表的状态变更和一组出站
//! 送达，再交给推送通道执行。

pub mod error;
pub mod router;

pub use error::ApplicationError;
pub use router::EventRouter;
