//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册、登录、令牌管理
//! - [`orders`] - 订单创建与状态流转
//! - [`restaurants`] - 店面浏览、商家资料与菜单管理

pub mod auth;
pub mod health;
pub mod orders;
pub mod restaurants;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue, Method, header};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::middleware::require_auth;
use crate::core::{Config, ServerState};
use crate::realtime::gateway;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Auth API - registration/login public, /me protected
        .merge(auth::router())
        // Order API - authentication required
        .merge(orders::router())
        // Restaurant API - browsing public, management protected
        .merge(restaurants::router())
        // Health API - public route
        .merge(health::router())
}

/// CORS layer pinned to the configured frontend origin
///
/// Credentials are allowed, so the origin must be exact; a wildcard
/// with credentials is rejected by browsers (and by tower-http).
fn cors_layer(config: &Config) -> CorsLayer {
    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(_) => {
            tracing::warn!(
                origin = %config.cors_origin,
                "CORS_ORIGIN is not a valid header value, falling back to permissive CORS"
            );
            CorsLayer::permissive()
        }
    }
}

/// Build a fully configured application with all middleware and state
///
/// This is used by both the HTTP server and in-process test calls.
pub fn build_app(state: ServerState) -> Router {
    let socket_layer = gateway::layer(state.clone());

    build_router()
        // ========== Tower HTTP Middleware ==========
        // CORS - Handle cross-origin requests
        .layer(cors_layer(&state.config))
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // ========== Application Middleware ==========
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // JWT authentication - executes before routes, injects CurrentUser
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        // socket.io endpoint (/socket.io), outermost
        .layer(socket_layer)
        .with_state(state)
}
