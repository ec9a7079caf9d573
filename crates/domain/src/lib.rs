//! 实时消息分发核心领域模型
//!
//! 包含连接、房间、消息等核心概念，以及分发核心依赖的协作方接口。

pub mod entities;
pub mod errors;
pub mod events;
pub mod services;
pub mod value_objects;

// 重新导出常用类型
pub use entities::*;
pub use errors::*;
pub use events::*;
pub use services::*;
pub use value_objects::*;
