//! 存储模块 - 内存对象存储
//!
//! 所有持久化状态都在进程内存中，通过 trait 注入到服务层，
//! 便于后续替换实现和在测试中隔离。
//!
//! - [`AccountStore`] - 顾客/餐厅账户与菜单
//! - [`OrderStore`] - 订单及状态流转
//! - [`RefreshTokenStore`] - 刷新令牌白名单

pub mod accounts;
pub mod orders;
pub mod tokens;

pub use accounts::{AccountStore, MemoryAccountStore, RestaurantRecord, UserRecord};
pub use orders::{MemoryOrderStore, NewOrder, OrderStore};
pub use tokens::{MemoryRefreshTokenStore, RefreshTokenStore};

use shared::models::OrderStatus;

/// 存储层错误
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

/// 存储层结果类型
pub type StoreResult<T> = Result<T, StoreError>;
