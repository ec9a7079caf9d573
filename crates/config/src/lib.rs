//! 统一配置中心
//!
//! 网关的全部运行参数都来自环境变量，未设置时使用开发默认值。

use serde::{Deserialize, Serialize};
use std::env;

/// 全局网关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// 服务配置
    pub server: ServerConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl GatewayConfig {
    /// 从环境变量加载配置，缺省值仅适合开发和测试
    pub fn from_env_with_defaults() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3000),
            },
        }
    }
}

impl ServerConfig {
    /// 监听地址字符串
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
