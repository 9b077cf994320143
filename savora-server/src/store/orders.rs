//! 订单存储
//!
//! 订单只追加，状态沿固定流转表前进。状态变更必须由订单所属餐厅
//! 发起，越权和非法流转在存储层拒绝。

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::models::{LineItem, Order, OrderStatus, Role};

use super::{StoreError, StoreResult};

/// 待写入的新订单 (id / 状态 / 时间戳由存储生成)
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: String,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub coin_delta: i64,
}

/// 订单存储接口
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// 创建订单，初始状态为 pending
    async fn create(&self, order: NewOrder) -> Order;

    /// 按身份列出可见订单：顾客看自己的，餐厅看发给自己的。
    /// 新订单在前。
    async fn list_for(&self, role: Role, id: &str) -> Vec<Order>;

    async fn get(&self, order_id: &str) -> Option<Order>;

    /// 状态流转。`requester_id` 必须是订单所属餐厅。
    async fn update_status(
        &self,
        order_id: &str,
        requester_id: &str,
        next: OrderStatus,
    ) -> StoreResult<Order>;
}

/// 基于追加列表的内存订单存储
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<Order>>,
    seq: AtomicU64,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订单 ID: `o-<毫秒时间戳>-<序号>`，序号保证同毫秒内唯一
    fn next_id(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!("o-{}-{:06}", Utc::now().timestamp_millis(), seq)
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Order {
        let record = Order {
            id: self.next_id(),
            user_id: order.user_id,
            restaurant_id: order.restaurant_id,
            restaurant_name: order.restaurant_name,
            items: order.items,
            total: order.total,
            coin_delta: order.coin_delta,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        self.orders.write().push(record.clone());
        record
    }

    async fn list_for(&self, role: Role, id: &str) -> Vec<Order> {
        let orders = self.orders.read();
        let mut visible: Vec<Order> = orders
            .iter()
            .filter(|o| match role {
                Role::User => o.user_id == id,
                Role::Restaurant => o.restaurant_id == id,
            })
            .cloned()
            .collect();
        visible.reverse();
        visible
    }

    async fn get(&self, order_id: &str) -> Option<Order> {
        self.orders
            .read()
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
    }

    async fn update_status(
        &self,
        order_id: &str,
        requester_id: &str,
        next: OrderStatus,
    ) -> StoreResult<Order> {
        let mut orders = self.orders.write();
        let order = orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| StoreError::NotFound(format!("order {order_id}")))?;

        if order.restaurant_id != requester_id {
            return Err(StoreError::Forbidden(
                "order belongs to another restaurant".to_string(),
            ));
        }

        if !order.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        order.status = next;
        Ok(order.clone())
    }
}
