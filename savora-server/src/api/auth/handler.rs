//! Authentication Handlers
//!
//! Handles registration, login, logout, and token management

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::store::accounts::hash_password;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text,
    validate_password, validate_required_text,
};
use crate::utils::{AppError, AppResult};

// Re-use shared DTOs for API consistency
use shared::client::{
    AccountInfo, AuthResponse, LoginRequest, LogoutRequest, MeResponse, RefreshRequest,
    RefreshResponse, RegisterRestaurantRequest, RegisterUserRequest,
};
use shared::models::Role;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Register a customer account
pub async fn register_user(
    State(state): State<ServerState>,
    Json(req): Json<RegisterUserRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let record = state.accounts.create_user(&req, password_hash).await?;
    tracing::info!(account = %record.id, "user registered");

    let pair = state
        .sessions
        .issue(&record.id, &record.email, Role::User)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: AccountInfo::User(record.to_public()),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
    ))
}

/// Register a restaurant account
pub async fn register_restaurant(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRestaurantRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&req.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&req.cuisine, "cuisine", MAX_SHORT_TEXT_LEN)?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let record = state.accounts.create_restaurant(&req, password_hash).await?;
    tracing::info!(account = %record.id, "restaurant registered");

    let pair = state
        .sessions
        .issue(&record.id, &record.email, Role::Restaurant)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: AccountInfo::Restaurant(record.to_public()),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
    ))
}

/// Login handler
///
/// Authenticates against the namespace selected by `role` (defaults to
/// user) and returns a fresh token pair.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let role = req.role.unwrap_or(Role::User);

    // Look up the account and verify the password. The outcome shape is
    // identical for every failure so emails cannot be enumerated.
    let verified: Option<(String, String, AccountInfo)> = match role {
        Role::User => match state.accounts.find_user_by_email(&req.email).await {
            Some(record) => {
                let valid = record.verify_password(&req.password).map_err(|e| {
                    AppError::internal(format!("Password verification failed: {}", e))
                })?;
                valid.then(|| {
                    (
                        record.id.clone(),
                        record.email.clone(),
                        AccountInfo::User(record.to_public()),
                    )
                })
            }
            None => None,
        },
        Role::Restaurant => match state.accounts.find_restaurant_by_email(&req.email).await {
            Some(record) => {
                let valid = record.verify_password(&req.password).map_err(|e| {
                    AppError::internal(format!("Password verification failed: {}", e))
                })?;
                valid.then(|| {
                    (
                        record.id.clone(),
                        record.email.clone(),
                        AccountInfo::Restaurant(record.to_public()),
                    )
                })
            }
            None => None,
        },
    };

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let Some((id, email, account)) = verified else {
        tracing::warn!(email = %req.email, role = %role, "login failed");
        return Err(AppError::invalid_credentials());
    };

    let pair = state.sessions.issue(&id, &email, role).await?;
    tracing::info!(account = %id, role = %role, "login successful");

    Ok(Json(AuthResponse {
        user: account,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Rotate a refresh token for a new token pair
pub async fn refresh(
    State(state): State<ServerState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let pair = state.sessions.rotate(&req.refresh_token).await?;

    Ok(Json(RefreshResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Logout: revoke the supplied refresh token
///
/// Always succeeds. Logging out with an unknown or absent token is a
/// no-op, not an error.
pub async fn logout(
    State(state): State<ServerState>,
    Json(req): Json<LogoutRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if let Some(token) = &req.refresh_token {
        let revoked = state.sessions.revoke(token).await;
        tracing::debug!(revoked, "logout");
    }
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Current account info
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<MeResponse>> {
    let account = match user.role {
        Role::User => state
            .accounts
            .find_user(&user.id)
            .await
            .map(|r| AccountInfo::User(r.to_public())),
        Role::Restaurant => state
            .accounts
            .find_restaurant(&user.id)
            .await
            .map(|r| AccountInfo::Restaurant(r.to_public())),
    };

    let account = account.ok_or_else(|| AppError::not_found(format!("account {}", user.id)))?;
    Ok(Json(MeResponse { user: account }))
}
