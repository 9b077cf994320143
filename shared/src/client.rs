//! Client-related types shared between server and clients
//!
//! Common request/response types used in API communication. Field names
//! are camelCase on the wire.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{LineItem, OrderStatus, RestaurantPublic, Role, UserPublic};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Register user request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Register restaurant request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRestaurantRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Which account namespace to authenticate against (defaults to user)
    #[serde(default)]
    pub role: Option<Role>,
}

/// Either side of the platform, as returned by auth endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountInfo {
    User(UserPublic),
    Restaurant(RestaurantPublic),
}

/// Login / register response: account data plus a token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: AccountInfo,
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh response: the rotated token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Logout request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// `GET /api/auth/me` response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: AccountInfo,
}

// =============================================================================
// Order API DTOs
// =============================================================================

/// Create order request (checkout)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub restaurant_id: String,
    #[serde(default)]
    pub restaurant_name: Option<String>,
    pub items: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Coins to credit; computed from the restaurant's coin rate when absent
    #[serde(default)]
    pub coin_delta: Option<i64>,
}

/// `PATCH /api/orders/{id}/status` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

// =============================================================================
// Restaurant API DTOs
// =============================================================================

/// Restaurant profile update (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub coin_rate: Option<i64>,
    #[serde(default)]
    pub coin_threshold: Option<i64>,
}

/// `GET /api/restaurants/{id}/rewards` response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsResponse {
    pub restaurant_id: String,
    pub coins: i64,
    pub coin_threshold: i64,
    pub progress_percent: f64,
    pub remaining: i64,
}
