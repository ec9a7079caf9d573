//! 基础设施层
//!
//! 提供领域接口的内存实现：连接注册表、房间订阅表、基于 channel 的
//! 推送通道，以及用于单进程部署和测试的协作方实现。

pub mod directory;
pub mod registry;
pub mod rooms;
pub mod transport;

pub use directory::{InMemoryMembershipDirectory, InMemoryMessageStore};
pub use registry::InMemoryConnectionRegistry;
pub use rooms::InMemoryRoomTracker;
pub use transport::ChannelTransport;
