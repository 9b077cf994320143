//! 统一错误处理
//!
//! 提供应用级错误类型 [`AppError`]，所有 API handler 统一返回
//! `AppResult<T>`。错误响应使用 `{code, message}` 信封，成功响应
//! 直接返回 JSON 数据。
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | HTTP |
//! |------|------|------|
//! | E1xxx | 凭证错误 | 401 |
//! | E2xxx | 权限错误 | 403 |
//! | E3xxx | 令牌错误 | 401/403 |
//! | E0xxx | 业务错误 | 400/404/409 |
//! | E9xxx | 系统错误 | 500 |
//!
//! # HTTP 映射
//!
//! 缺失令牌返回 401，无效/过期令牌和权限不足返回 403。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::auth::JwtError;
use crate::store::StoreError;

/// Result alias for API handlers
pub type AppResult<T> = Result<T, AppError>;

/// Error envelope returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error code (Exxxx)
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 凭证/令牌错误 ==========
    #[error("Authentication required")]
    /// 缺失令牌 (401)
    Unauthorized,

    #[error("Invalid email or password")]
    /// 登录凭证错误 (401)
    InvalidCredentials,

    #[error("Token expired")]
    /// 令牌过期 (403)
    TokenExpired,

    #[error("Invalid token: {0}")]
    /// 无效令牌 (403)
    InvalidToken(String),

    #[error("Permission denied: {0}")]
    /// 无权限 (403)
    Forbidden(String),

    // ========== 业务逻辑错误 ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Resource already exists: {0}")]
    /// 资源冲突 (409)
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    // ========== 系统错误 ==========
    #[error("Internal server error: {0}")]
    /// 内部错误 (500)，消息只记录日志不外泄
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "E3001", self.to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E1001", self.to_string()),

            AppError::TokenExpired => (StatusCode::FORBIDDEN, "E3003", self.to_string()),
            AppError::InvalidToken(_) => (StatusCode::FORBIDDEN, "E3002", self.to_string()),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "E2001", self.to_string()),

            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "E0003", self.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "E0004", self.to_string()),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "E0002", self.to_string()),

            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorBody {
            code: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    /// Unified message to prevent email enumeration during login
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials
    }

    pub fn token_expired() -> Self {
        Self::TokenExpired
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

// ========== Conversions ==========

impl From<JwtError> for AppError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::ExpiredToken => AppError::TokenExpired,
            other => AppError::InvalidToken(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail(_) => AppError::Conflict(e.to_string()),
            StoreError::NotFound(_) => AppError::NotFound(e.to_string()),
            StoreError::Forbidden(_) => AppError::Forbidden(e.to_string()),
            StoreError::InvalidTransition { .. } => AppError::Validation(e.to_string()),
        }
    }
}

impl From<shared::coin::InvalidThreshold> for AppError {
    fn from(e: shared::coin::InvalidThreshold) -> Self {
        AppError::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn http_status_mapping() {
        assert_eq!(status_of(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::TokenExpired), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AppError::invalid_token("bad")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(AppError::forbidden("nope")), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AppError::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::conflict("x")), StatusCode::CONFLICT);
        assert_eq!(status_of(AppError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AppError::internal("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_is_opaque() {
        let response = AppError::internal("connection string leaked").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The detail must never reach the client; it is only logged.
    }
}
