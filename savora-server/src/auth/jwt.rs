//! JWT 令牌服务
//!
//! 处理访问令牌和刷新令牌的生成、验证和解析。
//! 两类令牌使用不同的密钥签名，`token_type` claim 防止交叉使用。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::models::Role;
use thiserror::Error;
use uuid::Uuid;

/// 访问令牌类型标记
pub const TOKEN_TYPE_ACCESS: &str = "access";
/// 刷新令牌类型标记
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// 访问令牌密钥 (应至少 32 字节)
    pub access_secret: String,
    /// 刷新令牌密钥 (应至少 32 字节)
    pub refresh_secret: String,
    /// 访问令牌过期时间 (分钟)
    pub access_minutes: i64,
    /// 刷新令牌过期时间 (天)
    pub refresh_days: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: load_jwt_secret("JWT_SECRET"),
            refresh_secret: load_jwt_secret("JWT_REFRESH_SECRET"),
            access_minutes: std::env::var("JWT_ACCESS_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15),
            refresh_days: std::env::var("JWT_REFRESH_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "savora-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "savora-clients".to_string()),
        }
    }
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 账户 ID (Subject)
    pub sub: String,
    /// 邮箱
    pub email: String,
    /// 角色 (`user` / `restaurant`)
    pub role: String,
    /// 令牌类型 (`access` / `refresh`)
    pub token_type: String,
    /// 令牌唯一 ID，保证同一秒内签发的令牌互不相同
    pub jti: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),

    #[error("密钥生成失败: {0}")]
    KeyGenerationFailed(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

/// 生成可打印的安全 JWT 密钥 (用于开发环境)
pub fn generate_secure_printable_jwt_secret() -> String {
    let allowed_chars =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?";

    let rng = SystemRandom::new();
    let mut key = String::new();

    for _ in 0..64 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            // 如果随机数生成失败，使用固定的安全密钥
            return "SavoraServerDevelopmentSecureKey2025!".to_string();
        }
        let idx = (byte[0] as usize) % allowed_chars.len();
        key.push(allowed_chars.chars().nth(idx).unwrap());
    }

    key
}

/// 从环境变量安全地加载 JWT 密钥
fn load_jwt_secret(var: &str) -> String {
    match std::env::var(var) {
        Ok(secret) if secret.len() >= 32 => secret,
        Ok(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("⚠️  {var} is shorter than 32 chars, generating temporary key");
                generate_secure_printable_jwt_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                panic!("🚨 FATAL: {var} must be at least 32 characters long");
            }
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("⚠️  {var} not set! Generating secure temporary key for development.");
                generate_secure_printable_jwt_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                panic!("🚨 FATAL: {var} environment variable must be set in production!");
            }
        }
    }
}

/// 一对新签发的令牌
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl JwtService {
    /// 使用默认配置创建新的 JWT 服务
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let access_encoding = EncodingKey::from_secret(config.access_secret.as_bytes());
        let access_decoding = DecodingKey::from_secret(config.access_secret.as_bytes());
        let refresh_encoding = EncodingKey::from_secret(config.refresh_secret.as_bytes());
        let refresh_decoding = DecodingKey::from_secret(config.refresh_secret.as_bytes());

        Self {
            config,
            access_encoding,
            access_decoding,
            refresh_encoding,
            refresh_decoding,
        }
    }

    /// 为账户签发访问令牌 + 刷新令牌
    pub fn issue_pair(&self, id: &str, email: &str, role: Role) -> Result<TokenPair, JwtError> {
        let now = Utc::now();

        let access_claims = Claims {
            sub: id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: (now + Duration::minutes(self.config.access_minutes)).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let refresh_claims = Claims {
            token_type: TOKEN_TYPE_REFRESH.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: (now + Duration::days(self.config.refresh_days)).timestamp(),
            ..access_claims.clone()
        };

        let access_token = encode(&Header::default(), &access_claims, &self.access_encoding)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &self.refresh_encoding)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// 验证并解码访问令牌
    pub fn verify_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify(token, &self.access_decoding, TOKEN_TYPE_ACCESS)
    }

    /// 验证并解码刷新令牌
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify(token, &self.refresh_decoding, TOKEN_TYPE_REFRESH)
    }

    fn verify(
        &self,
        token: &str,
        key: &DecodingKey,
        expected_type: &str,
    ) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
            _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
        })?;

        if token_data.claims.token_type != expected_type {
            return Err(JwtError::InvalidToken(format!(
                "expected {expected_type} token, got {}",
                token_data.claims.token_type
            )));
        }

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// 当前账户上下文 (从 JWT Claims 解析)
///
/// 由认证中间件创建，注入到请求处理函数
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 账户 ID
    pub id: String,
    /// 邮箱
    pub email: String,
    /// 角色
    pub role: Role,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role: Role = claims
            .role
            .parse()
            .map_err(|_| JwtError::InvalidToken(format!("unknown role '{}'", claims.role)))?;

        Ok(Self {
            id: claims.sub,
            email: claims.email,
            role,
        })
    }
}

impl CurrentUser {
    /// 是否顾客账户
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// 是否餐厅账户
    pub fn is_restaurant(&self) -> bool {
        self.role == Role::Restaurant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            access_secret: "test-access-secret-at-least-32-chars!!".to_string(),
            refresh_secret: "test-refresh-secret-at-least-32-chars!".to_string(),
            access_minutes: 15,
            refresh_days: 7,
            issuer: "savora-server".to_string(),
            audience: "savora-clients".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let service = JwtService::with_config(test_config());

        let pair = service
            .issue_pair("u-123", "john@example.com", Role::User)
            .expect("Failed to issue token pair");

        let access = service
            .verify_access(&pair.access_token)
            .expect("Failed to verify access token");
        assert_eq!(access.sub, "u-123");
        assert_eq!(access.email, "john@example.com");
        assert_eq!(access.role, "user");
        assert_eq!(access.token_type, TOKEN_TYPE_ACCESS);

        let refresh = service
            .verify_refresh(&pair.refresh_token)
            .expect("Failed to verify refresh token");
        assert_eq!(refresh.sub, "u-123");
        assert_eq!(refresh.token_type, TOKEN_TYPE_REFRESH);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let service = JwtService::with_config(test_config());
        let pair = service
            .issue_pair("r-9", "resto@example.com", Role::Restaurant)
            .expect("Failed to issue token pair");

        // 访问令牌不能当刷新令牌用，反之亦然 (密钥不同)
        assert!(service.verify_refresh(&pair.access_token).is_err());
        assert!(service.verify_access(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = JwtService::with_config(test_config());
        assert!(service.verify_access("not-a-jwt").is_err());
        assert!(service.verify_access("").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = JwtService::with_config(test_config());
        let mut other_config = test_config();
        other_config.access_secret = "another-secret-that-is-32-chars-long!!".to_string();
        let other = JwtService::with_config(other_config);

        let pair = service
            .issue_pair("u-1", "a@b.com", Role::User)
            .expect("Failed to issue token pair");
        assert!(other.verify_access(&pair.access_token).is_err());
    }

    #[test]
    fn test_current_user_from_claims() {
        let service = JwtService::with_config(test_config());
        let pair = service
            .issue_pair("r-42", "resto@example.com", Role::Restaurant)
            .expect("Failed to issue token pair");
        let claims = service
            .verify_access(&pair.access_token)
            .expect("Failed to verify");

        let user = CurrentUser::try_from(claims).expect("Failed to build CurrentUser");
        assert_eq!(user.id, "r-42");
        assert!(user.is_restaurant());
        assert!(!user.is_user());
    }

    #[test]
    fn test_pairs_issued_back_to_back_are_distinct() {
        let service = JwtService::with_config(test_config());
        let a = service
            .issue_pair("u-1", "a@b.com", Role::User)
            .expect("Failed to issue first pair");
        let b = service
            .issue_pair("u-1", "a@b.com", Role::User)
            .expect("Failed to issue second pair");

        // 同一秒内签发的两对令牌必须互不相同 (jti 保证)
        assert_ne!(a.access_token, b.access_token);
        assert_ne!(a.refresh_token, b.refresh_token);
    }

    #[test]
    fn test_printable_secret_generation() {
        let key1 = generate_secure_printable_jwt_secret();
        let key2 = generate_secure_printable_jwt_secret();
        assert_eq!(key1.len(), 64);
        assert_ne!(key1, key2);
    }
}
