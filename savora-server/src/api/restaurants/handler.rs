//! Restaurant Handlers
//!
//! Public storefront browsing plus the restaurant dashboard (profile,
//! menu management) and the customer loyalty view.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

use shared::client::{ProfileUpdateRequest, RewardsResponse};
use shared::coin::next_reward_progress;
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, RestaurantPublic};

/// Storefront: list all restaurants (public view, oldest first)
pub async fn list(State(state): State<ServerState>) -> Json<Vec<RestaurantPublic>> {
    Json(state.accounts.list_restaurants().await)
}

/// Storefront: one restaurant's public view
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<RestaurantPublic>> {
    let record = state
        .accounts
        .find_restaurant(&id)
        .await
        .ok_or_else(|| AppError::not_found(format!("restaurant {id}")))?;
    Ok(Json(record.to_public()))
}

/// Storefront: one restaurant's menu
pub async fn get_menu(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<MenuItem>>> {
    Ok(Json(state.accounts.list_menu(&id).await?))
}

/// Loyalty: the caller's coin progress at one restaurant
pub async fn get_rewards(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<RewardsResponse>> {
    if !user.is_user() {
        return Err(AppError::forbidden("rewards are a customer feature"));
    }

    let restaurant = state
        .accounts
        .find_restaurant(&id)
        .await
        .ok_or_else(|| AppError::not_found(format!("restaurant {id}")))?;

    let account = state
        .accounts
        .find_user(&user.id)
        .await
        .ok_or_else(|| AppError::not_found(format!("account {}", user.id)))?;

    let coins = account
        .coin_balances
        .iter()
        .find(|b| b.restaurant_id == id)
        .map(|b| b.coins)
        .unwrap_or(0);

    let progress = next_reward_progress(coins, restaurant.coin_threshold)?;

    Ok(Json(RewardsResponse {
        restaurant_id: id,
        coins,
        coin_threshold: restaurant.coin_threshold,
        progress_percent: progress.progress_percent,
        remaining: progress.remaining,
    }))
}

// ========== Dashboard (restaurant role) ==========

fn require_restaurant(user: &CurrentUser) -> AppResult<()> {
    if !user.is_restaurant() {
        return Err(AppError::forbidden(
            "this endpoint is for restaurant accounts",
        ));
    }
    Ok(())
}

/// Dashboard: the caller's own profile
pub async fn get_profile(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<RestaurantPublic>> {
    require_restaurant(&user)?;
    let record = state
        .accounts
        .find_restaurant(&user.id)
        .await
        .ok_or_else(|| AppError::not_found(format!("restaurant {}", user.id)))?;
    Ok(Json(record.to_public()))
}

/// Dashboard: partial profile update
pub async fn update_profile(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<ProfileUpdateRequest>,
) -> AppResult<Json<RestaurantPublic>> {
    require_restaurant(&user)?;

    if let Some(name) = &req.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&req.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&req.cuisine, "cuisine", MAX_SHORT_TEXT_LEN)?;
    if let Some(rate) = req.coin_rate
        && rate < 0
    {
        return Err(AppError::validation("coinRate must not be negative"));
    }
    if let Some(threshold) = req.coin_threshold
        && threshold <= 0
    {
        return Err(AppError::validation("coinThreshold must be positive"));
    }

    let record = state
        .accounts
        .update_restaurant_profile(&user.id, &req)
        .await?;
    tracing::info!(account = %user.id, "restaurant profile updated");
    Ok(Json(record.to_public()))
}

/// Dashboard: add a menu item
pub async fn create_menu_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<MenuItemCreate>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    require_restaurant(&user)?;
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&req.description, "description", MAX_DESCRIPTION_LEN)?;
    if req.price < Decimal::ZERO {
        return Err(AppError::validation("price must not be negative"));
    }

    let item = state.accounts.add_menu_item(&user.id, &req).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Dashboard: update a menu item (partial)
pub async fn update_menu_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<String>,
    Json(req): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    require_restaurant(&user)?;
    if let Some(name) = &req.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&req.description, "description", MAX_DESCRIPTION_LEN)?;
    if let Some(price) = req.price
        && price < Decimal::ZERO
    {
        return Err(AppError::validation("price must not be negative"));
    }

    let item = state
        .accounts
        .update_menu_item(&user.id, &item_id, &req)
        .await?;
    Ok(Json(item))
}

/// Dashboard: remove a menu item
pub async fn delete_menu_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    require_restaurant(&user)?;
    state.accounts.remove_menu_item(&user.id, &item_id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
