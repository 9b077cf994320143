//! Savora Client - 客户端桥接层
//!
//! 管理与 Savora 服务端的 socket.io 连接生命周期：
//! 登录后连接、登出时断开、按正在浏览的订单加入/离开房间。
//! 底层传输通过 [`SocketTransport`] 注入，桥接层只负责状态机。

pub mod error;
pub mod socket;

pub use error::{ClientError, ClientResult};
pub use socket::{SocketBridge, SocketTransport};

// Re-export shared realtime contract for convenience
pub use shared::message::{
    JOIN_ORDER, LEAVE_ORDER, ORDER_CREATED, ORDER_STATUS, OrderEventPayload, SocketAuth,
};
