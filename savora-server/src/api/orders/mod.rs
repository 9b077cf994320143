//! Order API Module
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/orders | GET | 按身份列出订单 | 需要 |
//! | /api/orders | POST | 下单 (仅顾客) | 需要 |
//! | /api/orders/{id}/status | PATCH | 状态流转 (仅所属餐厅) | 需要 |

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}/status", patch(handler::update_status))
}
