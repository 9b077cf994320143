//! Auth API Module
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/auth/register/user | POST | 注册顾客账户 | 无 |
//! | /api/auth/register/restaurant | POST | 注册餐厅账户 | 无 |
//! | /api/auth/login | POST | 登录 | 无 |
//! | /api/auth/refresh | POST | 轮换刷新令牌 | 无 (携带刷新令牌) |
//! | /api/auth/logout | POST | 登出并吊销刷新令牌 | 无 (携带刷新令牌) |
//! | /api/auth/me | GET | 当前账户信息 | 需要 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Auth router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register/user", post(handler::register_user))
        .route("/register/restaurant", post(handler::register_restaurant))
        .route("/login", post(handler::login))
        .route("/refresh", post(handler::refresh))
        .route("/logout", post(handler::logout))
        .route("/me", get(handler::me))
}
