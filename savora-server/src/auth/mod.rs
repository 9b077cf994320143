//! 认证模块
//!
//! JWT 令牌服务、会话管理 (刷新令牌轮换/吊销)、认证中间件和提取器。

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod session;

pub use jwt::{
    Claims, CurrentUser, JwtConfig, JwtError, JwtService, TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH,
    TokenPair, generate_secure_printable_jwt_secret,
};
pub use middleware::{is_public_route, require_auth};
pub use session::SessionService;
