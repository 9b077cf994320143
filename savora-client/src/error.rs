//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// 未携带访问令牌就尝试连接
    #[error("Authentication required: no access token")]
    MissingToken,

    /// 连接建立失败
    #[error("Connection failed: {0}")]
    Connection(String),

    /// 事件发送失败
    #[error("Emit failed: {0}")]
    Emit(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
