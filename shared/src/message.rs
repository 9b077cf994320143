//! Realtime event types
//!
//! 服务端和客户端之间的 socket.io 事件约定：
//!
//! - 客户端事件: [`JOIN_ORDER`] / [`LEAVE_ORDER`] (加入/离开订单房间)
//! - 服务端事件: [`ORDER_CREATED`] / [`ORDER_STATUS`]
//! - 房间命名: `order:<id>` ([`order_room`])

use serde::{Deserialize, Serialize};

use crate::models::{Order, OrderStatus};

/// Server → client: a new order was placed
pub const ORDER_CREATED: &str = "order:created";

/// Server → client: an order's status changed
pub const ORDER_STATUS: &str = "order:status";

/// Client → server: subscribe to one order's broadcast room
pub const JOIN_ORDER: &str = "join:order";

/// Client → server: unsubscribe from one order's broadcast room
pub const LEAVE_ORDER: &str = "leave:order";

/// Room name for order-scoped broadcasts
pub fn order_room(order_id: &str) -> String {
    format!("order:{order_id}")
}

/// Socket handshake auth payload: `{ auth: { token } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketAuth {
    pub token: String,
}

/// Payload delivered with order lifecycle events
///
/// The gateway routes on the optional ids: `order_id` selects the
/// broadcast room, `user_id` / `restaurant_id` select identity-mapped
/// connections. Absent ids skip that target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

impl OrderEventPayload {
    /// Payload addressing every party of an order
    pub fn for_order(order: &Order) -> Self {
        Self {
            order_id: Some(order.id.clone()),
            user_id: Some(order.user_id.clone()),
            restaurant_id: Some(order.restaurant_id.clone()),
            status: order.status,
            order: Some(order.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_naming() {
        assert_eq!(order_room("o-1-000001"), "order:o-1-000001");
    }

    #[test]
    fn payload_omits_absent_targets() {
        let payload = OrderEventPayload {
            order_id: Some("o-1-000001".into()),
            user_id: None,
            restaurant_id: None,
            status: OrderStatus::Pending,
            order: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["orderId"], "o-1-000001");
        assert!(json.get("userId").is_none());
        assert!(json.get("restaurantId").is_none());
        assert_eq!(json["status"], "pending");
    }
}
