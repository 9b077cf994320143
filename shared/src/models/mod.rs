//! Domain models
//!
//! # 结构
//!
//! - [`account`] - 账户模型 (用户 / 餐厅)
//! - [`order`] - 订单模型和状态机
//! - [`menu`] - 菜单模型

pub mod account;
pub mod menu;
pub mod order;

pub use account::{CoinBalance, RestaurantPublic, Role, UserPublic};
pub use menu::{MenuItem, MenuItemCreate, MenuItemUpdate};
pub use order::{LineItem, Order, OrderStatus};
