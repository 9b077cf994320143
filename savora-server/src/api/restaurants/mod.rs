//! Restaurant API Module
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/restaurants | GET | 店面列表 | 无 |
//! | /api/restaurants/profile | GET | 本店资料 | 餐厅 |
//! | /api/restaurants/profile | PUT | 更新本店资料 | 餐厅 |
//! | /api/restaurants/menu | POST | 新增菜品 | 餐厅 |
//! | /api/restaurants/menu/{itemId} | PUT | 更新菜品 | 餐厅 |
//! | /api/restaurants/menu/{itemId} | DELETE | 删除菜品 | 餐厅 |
//! | /api/restaurants/{id} | GET | 餐厅详情 | 无 |
//! | /api/restaurants/{id}/menu | GET | 餐厅菜单 | 无 |
//! | /api/restaurants/{id}/rewards | GET | 会员进度 | 顾客 |
//!
//! 静态段 (`profile`, `menu`) 必须注册在 `{id}` 之前。

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Restaurant router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/restaurants", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        // Management (restaurant role)
        .route("/profile", get(handler::get_profile).put(handler::update_profile))
        .route("/menu", post(handler::create_menu_item))
        .route(
            "/menu/{item_id}",
            put(handler::update_menu_item).delete(handler::delete_menu_item),
        )
        // Storefront (public)
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/menu", get(handler::get_menu))
        // Loyalty (user role)
        .route("/{id}/rewards", get(handler::get_rewards))
}
