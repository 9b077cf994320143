//! Order model and status state machine
//!
//! 订单状态是显式有限状态机，所有服务端变更必须通过
//! [`OrderStatus::can_transition_to`] 验证，拒绝非法跳转
//! (例如 completed → preparing)。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// Transition table:
///
/// | From | To |
/// |------|----|
/// | pending | preparing, cancelled |
/// | preparing | ready, cancelled |
/// | ready | completed |
/// | completed | (terminal) |
/// | cancelled | (terminal) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition is allowed from this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Validate a status transition
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Preparing)
                | (Pending, Cancelled)
                | (Preparing, Ready)
                | (Preparing, Cancelled)
                | (Ready, Completed)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order (name, unit price, quantity)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
}

/// Order record
///
/// Append-only apart from `status`, which is mutated exclusively by the
/// target restaurant through the order store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// `o-<unix_millis>-<seq>` — creation-ordered, unique even for
    /// same-millisecond bursts (seq is a process-wide counter)
    pub id: String,
    pub user_id: String,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub items: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Loyalty coins credited to the owner for this order
    pub coin_delta: i64,
    pub status: OrderStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Completed));
    }

    #[test]
    fn cancellation_only_before_ready() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Preparing.can_transition_to(Cancelled));
        assert!(!Ready.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_reject_everything() {
        use OrderStatus::*;
        for next in [Pending, Preparing, Ready, Completed, Cancelled] {
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Preparing.is_terminal());
    }

    #[test]
    fn no_backwards_jumps() {
        use OrderStatus::*;
        assert!(!Preparing.can_transition_to(Pending));
        assert!(!Ready.can_transition_to(Preparing));
        assert!(!Pending.can_transition_to(Ready));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn status_serde_lowercase() {
        assert_eq!(serde_json::to_string(&OrderStatus::Preparing).unwrap(), "\"preparing\"");
        let s: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(s, OrderStatus::Cancelled);
        assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_err());
    }
}
