//! Savora Server - 在线订餐平台后端
//!
//! # 架构概述
//!
//! 本模块是 Savora 服务端的主入口，提供以下核心功能：
//!
//! - **认证** (`auth`): JWT + Argon2 认证体系，刷新令牌轮换
//! - **存储** (`store`): 内存对象存储 (账户、订单、令牌白名单)
//! - **实时** (`realtime`): socket.io 订单事件网关
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! savora-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、会话
//! ├── store/         # 内存存储
//! ├── realtime/      # socket.io 网关
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod realtime;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService, SessionService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv + 日志)
///
/// 日志级别取 `LOG_LEVEL`，文件输出目录取 `LOG_DIR` (目录必须已存在)。
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____
  / ___/____ __   ______  _________ _
  \__ \/ __ `/ | / / __ \/ ___/ __ `/
 ___/ / /_/ /| |/ / /_/ / /  / /_/ /
/____/\__,_/ |___/\____/_/   \__,_/
    "#
    );
}
