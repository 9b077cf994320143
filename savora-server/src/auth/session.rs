//! 会话服务
//!
//! 管理刷新令牌的生命周期：签发、轮换、吊销。
//!
//! 刷新令牌采用白名单模型：只有存在于 [`RefreshTokenStore`] 中的令牌
//! 才能换取新令牌。轮换时旧令牌先移除再签发新对，吊销后立即失效。
//! 验签失败的令牌也会从白名单移除，失败路径一律关闭。

use std::sync::Arc;

use shared::models::Role;

use crate::auth::{Claims, JwtError, JwtService, TokenPair};
use crate::store::RefreshTokenStore;

/// 会话服务
#[derive(Clone)]
pub struct SessionService {
    jwt: Arc<JwtService>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl SessionService {
    pub fn new(jwt: Arc<JwtService>, refresh_tokens: Arc<dyn RefreshTokenStore>) -> Self {
        Self {
            jwt,
            refresh_tokens,
        }
    }

    /// 为账户签发新令牌对并登记刷新令牌
    pub async fn issue(&self, id: &str, email: &str, role: Role) -> Result<TokenPair, JwtError> {
        let pair = self.jwt.issue_pair(id, email, role)?;
        self.refresh_tokens.insert(&pair.refresh_token).await;
        Ok(pair)
    }

    /// 轮换刷新令牌：旧令牌作废，返回新令牌对
    ///
    /// 白名单检查先于验签：未登记的令牌直接拒绝，不泄露验签细节。
    /// 登记过但验签失败的令牌 (篡改/过期) 会被移除。
    pub async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, JwtError> {
        if !self.refresh_tokens.contains(refresh_token).await {
            return Err(JwtError::InvalidToken(
                "refresh token is not recognized".to_string(),
            ));
        }

        let claims = match self.jwt.verify_refresh(refresh_token) {
            Ok(claims) => claims,
            Err(e) => {
                self.refresh_tokens.remove(refresh_token).await;
                return Err(e);
            }
        };

        let role: Role = claims
            .role
            .parse()
            .map_err(|_| JwtError::InvalidToken(format!("unknown role '{}'", claims.role)))?;

        self.refresh_tokens.remove(refresh_token).await;
        let pair = self.jwt.issue_pair(&claims.sub, &claims.email, role)?;
        self.refresh_tokens.insert(&pair.refresh_token).await;
        Ok(pair)
    }

    /// 吊销单个刷新令牌 (登出)
    ///
    /// 吊销未登记的令牌不是错误，返回 `false`。
    pub async fn revoke(&self, refresh_token: &str) -> bool {
        self.refresh_tokens.remove(refresh_token).await
    }

    /// 验证访问令牌
    pub fn verify_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt.verify_access(token)
    }
}
