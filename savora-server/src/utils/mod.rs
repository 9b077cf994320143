//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`AppResult`] - handler 返回类型别名
//! - 日志、输入验证等工具

pub mod error;
pub mod logger;
pub mod validation;

pub use error::{AppError, AppResult, ErrorBody};
