use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3001 | HTTP 服务端口 |
/// | CORS_ORIGIN | http://localhost:5173 | 允许的前端来源 |
/// | ENVIRONMENT | development | 运行环境 |
/// | JWT_SECRET | (开发环境自动生成) | 访问令牌密钥 |
/// | JWT_REFRESH_SECRET | (开发环境自动生成) | 刷新令牌密钥 |
/// | JWT_ACCESS_MINUTES | 15 | 访问令牌有效期(分钟) |
/// | JWT_REFRESH_DAYS | 7 | 刷新令牌有效期(天) |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 CORS_ORIGIN=https://app.example.com cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 允许跨域的前端来源
    pub cors_origin: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(http_port: u16, jwt: JwtConfig) -> Self {
        let mut config = Self::from_env();
        config.http_port = http_port;
        config.jwt = jwt;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
