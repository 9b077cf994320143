//! 实时模块 - socket.io 网关
//!
//! 订单生命周期事件通过三个通道送达：
//!
//! 1. 订单房间 `order:<id>` (客户端主动订阅)
//! 2. 下单顾客的身份连接
//! 3. 接单餐厅的身份连接
//!
//! 投递是尽力而为的：掉线的接收方收不到事件，也不会重发。

pub mod gateway;
pub mod registry;

pub use registry::{ConnectionRegistry, Identity};

use std::sync::{Arc, OnceLock};

use shared::message::order_room;
use shared::models::Role;
use socketioxide::SocketIo;
use tracing::debug;

/// 实时事件服务
///
/// HTTP 层通过它向已连接客户端广播订单事件。`SocketIo` 句柄在
/// 路由装配时通过 [`attach`](Self::attach) 延迟注入；未注入前所有
/// 广播都是空操作，REST 层不依赖网关存在。
#[derive(Clone, Default)]
pub struct RealtimeService {
    registry: Arc<ConnectionRegistry>,
    io: Arc<OnceLock<SocketIo>>,
}

impl RealtimeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注入 socket.io 句柄 (只能调用一次)
    pub fn attach(&self, io: SocketIo) {
        if self.io.set(io).is_err() {
            debug!("socket.io handle already attached, ignoring");
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// 活跃身份连接数
    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// 广播订单事件
    ///
    /// 每个 socket 至多收到一次：身份连接已加入订单房间时跳过
    /// 定向投递，由房间广播覆盖。
    pub async fn emit_order_event(&self, event: &str, payload: &shared::OrderEventPayload) {
        let Some(io) = self.io.get() else {
            debug!(event, "realtime gateway not attached, dropping event");
            return;
        };

        let room = payload.order_id.as_deref().map(order_room);

        // 身份定向投递
        let identity_targets = [
            payload.user_id.as_ref().map(|id| Identity {
                role: Role::User,
                id: id.clone(),
            }),
            payload.restaurant_id.as_ref().map(|id| Identity {
                role: Role::Restaurant,
                id: id.clone(),
            }),
        ];

        for identity in identity_targets.into_iter().flatten() {
            let Some(sid) = self.registry.lookup(&identity) else {
                continue;
            };
            let Some(socket) = io.get_socket(sid) else {
                continue;
            };
            // 已订阅房间的连接由房间广播覆盖
            if let Some(room) = &room
                && covered_by_room(&socket.rooms(), room)
            {
                continue;
            }
            if let Err(e) = socket.emit(event, payload) {
                debug!(event, sid = %sid, error = %e, "identity emit failed");
            }
        }

        // 订单房间广播
        if let Some(room) = room
            && let Err(e) = io.to(room).emit(event, payload).await
        {
            debug!(event, error = %e, "room broadcast failed");
        }
    }
}

/// 定向投递的去重判定：目标 socket 已在订单房间内时跳过，
/// 让房间广播送达，保证每个 socket 至多收到一次。
fn covered_by_room<R: AsRef<str>>(rooms: &[R], room: &str) -> bool {
    rooms.iter().any(|r| r.as_ref() == room)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_emit_skipped_when_target_sits_in_room() {
        let rooms = vec!["order:o-1".to_string()];
        assert!(covered_by_room(&rooms, "order:o-1"));
    }

    #[test]
    fn other_rooms_do_not_suppress_direct_emit() {
        let rooms = vec!["order:o-2".to_string(), "order:o-3".to_string()];
        assert!(!covered_by_room(&rooms, "order:o-1"));
        assert!(!covered_by_room::<String>(&[], "order:o-1"));
    }

    #[tokio::test]
    async fn emit_without_gateway_is_a_noop() {
        let service = RealtimeService::new();
        let payload = shared::OrderEventPayload {
            order_id: Some("o-1".to_string()),
            user_id: Some("u-1".to_string()),
            restaurant_id: None,
            status: shared::OrderStatus::Pending,
            order: None,
        };
        // 网关未挂载时广播安静地丢弃，不会 panic
        service
            .emit_order_event(shared::message::ORDER_CREATED, &payload)
            .await;
        assert_eq!(service.connection_count(), 0);
    }
}
