//! Order Handlers
//!
//! Checkout, order listing, and status transitions. Every mutation
//! fans out a realtime event after the store accepts it.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::store::NewOrder;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

use shared::client::{CreateOrderRequest, UpdateOrderStatusRequest};
use shared::message::{ORDER_CREATED, ORDER_STATUS};
use shared::OrderEventPayload;
use shared::models::Order;

/// 一张订单最多的行项目数
const MAX_LINE_ITEMS: usize = 100;

/// List orders visible to the caller (owner for users, target for
/// restaurants), newest first.
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> Json<Vec<Order>> {
    Json(state.orders.list_for(user.role, &user.id).await)
}

/// Checkout: create an order against one restaurant
///
/// Coins are credited to the customer at the restaurant's coin rate
/// (`floor(total × rate)`) unless the request carries an explicit
/// `coinDelta`.
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    if !user.is_user() {
        return Err(AppError::forbidden("only customers can place orders"));
    }

    if req.items.is_empty() {
        return Err(AppError::validation("order must contain at least one item"));
    }
    if req.items.len() > MAX_LINE_ITEMS {
        return Err(AppError::validation(format!(
            "order has too many items (max {MAX_LINE_ITEMS})"
        )));
    }
    for item in &req.items {
        validate_required_text(&item.name, "item name", MAX_NAME_LEN)?;
        if item.quantity == 0 {
            return Err(AppError::validation("item quantity must be at least 1"));
        }
        if item.price < Decimal::ZERO {
            return Err(AppError::validation("item price must not be negative"));
        }
    }
    if req.total < Decimal::ZERO {
        return Err(AppError::validation("order total must not be negative"));
    }
    if let Some(delta) = req.coin_delta
        && delta < 0
    {
        return Err(AppError::validation("coinDelta must not be negative"));
    }

    let restaurant = state
        .accounts
        .find_restaurant(&req.restaurant_id)
        .await
        .ok_or_else(|| AppError::not_found(format!("restaurant {}", req.restaurant_id)))?;

    let coin_delta = match req.coin_delta {
        Some(delta) => delta,
        None => (req.total * Decimal::from(restaurant.coin_rate))
            .floor()
            .to_i64()
            .ok_or_else(|| AppError::validation("order total is out of range"))?,
    };

    let order = state
        .orders
        .create(NewOrder {
            user_id: user.id.clone(),
            restaurant_id: restaurant.id.clone(),
            restaurant_name: req.restaurant_name.unwrap_or_else(|| restaurant.name.clone()),
            items: req.items,
            total: req.total,
            coin_delta,
        })
        .await;

    if coin_delta > 0 {
        let balance = state
            .accounts
            .credit_coins(&user.id, &restaurant.id, coin_delta)
            .await?;
        tracing::debug!(order = %order.id, coins = coin_delta, balance, "coins credited");
    }

    tracing::info!(order = %order.id, account = %user.id, restaurant = %restaurant.id, "order placed");

    state
        .emit_order_event(ORDER_CREATED, &OrderEventPayload::for_order(&order))
        .await;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Advance an order along its status lifecycle
///
/// Only the restaurant the order was placed with may move it, and only
/// along the allowed transitions. Everything else is rejected before
/// any event is emitted.
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<Order>> {
    if !user.is_restaurant() {
        return Err(AppError::forbidden(
            "only restaurants can update order status",
        ));
    }

    let order = state
        .orders
        .update_status(&order_id, &user.id, req.status)
        .await?;

    tracing::info!(order = %order.id, status = %order.status, "order status changed");

    state
        .emit_order_event(ORDER_STATUS, &OrderEventPayload::for_order(&order))
        .await;

    Ok(Json(order))
}
