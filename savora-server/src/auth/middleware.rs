//! 认证中间件
//!
//! 为 JWT 认证提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// 认证中间件 - 要求账户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展 (`req.extensions_mut().insert(user)`)。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - 公共 API 路由，见 [`is_public_route`]
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 403 TokenExpired |
/// | 无效令牌 | 403 InvalidToken |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if is_public_route(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    // 验证令牌
    match state.sessions.verify_access(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 判断路由是否无需认证
///
/// - 非 `/api/` 路径 (让它们正常返回 404)
/// - `/api/health`
/// - `/api/auth/*` 除 `/api/auth/me` 外 (注册、登录、刷新、登出)
/// - `GET /api/restaurants` 及 `GET /api/restaurants/{id}`、
///   `GET /api/restaurants/{id}/menu` (店面公开浏览)
///
/// `/api/restaurants/profile` 和 `/api/restaurants/{id}/rewards`
/// 始终需要认证。
pub fn is_public_route(method: &http::Method, path: &str) -> bool {
    if !path.starts_with("/api/") {
        return true;
    }

    if path == "/api/health" {
        return true;
    }

    if path.starts_with("/api/auth/") {
        return path != "/api/auth/me";
    }

    // 公开的餐厅浏览路由只接受 GET
    if method != http::Method::GET {
        return false;
    }

    if path == "/api/restaurants" {
        return true;
    }

    if let Some(rest) = path.strip_prefix("/api/restaurants/") {
        let mut segments = rest.split('/');
        let id = segments.next().unwrap_or("");
        let tail = segments.next();

        // 商家管理路由与会员进度路由不公开
        if id == "profile" || id == "menu" {
            return false;
        }

        return match (tail, segments.next()) {
            (None, _) => !id.is_empty(),
            (Some("menu"), None) => true,
            _ => false,
        };
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn auth_routes_are_public_except_me() {
        assert!(is_public_route(&Method::POST, "/api/auth/login"));
        assert!(is_public_route(&Method::POST, "/api/auth/register/user"));
        assert!(is_public_route(&Method::POST, "/api/auth/refresh"));
        assert!(is_public_route(&Method::POST, "/api/auth/logout"));
        assert!(!is_public_route(&Method::GET, "/api/auth/me"));
    }

    #[test]
    fn storefront_browsing_is_public() {
        assert!(is_public_route(&Method::GET, "/api/restaurants"));
        assert!(is_public_route(&Method::GET, "/api/restaurants/r-1"));
        assert!(is_public_route(&Method::GET, "/api/restaurants/r-1/menu"));
    }

    #[test]
    fn management_and_rewards_routes_are_protected() {
        assert!(!is_public_route(&Method::GET, "/api/restaurants/profile"));
        assert!(!is_public_route(&Method::PUT, "/api/restaurants/profile"));
        assert!(!is_public_route(&Method::POST, "/api/restaurants/menu"));
        assert!(!is_public_route(&Method::PUT, "/api/restaurants/menu/m-1"));
        assert!(!is_public_route(&Method::GET, "/api/restaurants/r-1/rewards"));
        assert!(!is_public_route(&Method::DELETE, "/api/restaurants/r-1"));
    }

    #[test]
    fn orders_require_auth() {
        assert!(!is_public_route(&Method::GET, "/api/orders"));
        assert!(!is_public_route(&Method::POST, "/api/orders"));
        assert!(!is_public_route(&Method::PATCH, "/api/orders/o-1/status"));
    }

    #[test]
    fn non_api_paths_skip_auth() {
        assert!(is_public_route(&Method::GET, "/"));
        assert!(is_public_route(&Method::GET, "/favicon.ico"));
    }

    #[test]
    fn health_is_public() {
        assert!(is_public_route(&Method::GET, "/api/health"));
    }
}
