//! socket.io 生命周期桥接
//!
//! 连接跟随会话走：登录成功后用访问令牌建立连接，登出时断开并清除
//! 状态。订单详情页进入/离开时订阅/退订对应的订单房间。
//!
//! 实际的网络收发通过 [`SocketTransport`] 注入，桥接层只维护
//! 连接状态机，便于在测试中用内存实现替换传输。

use async_trait::async_trait;
use tracing::debug;

use shared::message::{JOIN_ORDER, LEAVE_ORDER, SocketAuth};

use crate::error::{ClientError, ClientResult};

/// 底层 socket 传输抽象
#[async_trait]
pub trait SocketTransport: Send + Sync {
    /// 携带握手凭证建立连接
    async fn connect(&self, auth: &SocketAuth) -> ClientResult<()>;

    /// 发送一个事件
    async fn emit(&self, event: &str, data: &str) -> ClientResult<()>;

    /// 断开连接
    async fn disconnect(&self);
}

/// 订单实时桥接
///
/// 状态机规则：
///
/// - [`connect`](Self::connect) - 登录后调用。无令牌直接拒绝，
///   不触发传输层；已连接时幂等，不会重复建连。
/// - [`disconnect`](Self::disconnect) - 登出时调用。断开并清除
///   连接状态，重复调用无害。
/// - [`join_order`](Self::join_order) / [`leave_order`](Self::leave_order) -
///   只在连接建立后发送，断线时静默跳过。
pub struct SocketBridge<T: SocketTransport> {
    transport: T,
    connected: bool,
}

impl<T: SocketTransport> SocketBridge<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            connected: false,
        }
    }

    /// 是否已连接
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// 使用访问令牌建立连接 (登录后)
    pub async fn connect(&mut self, token: &str) -> ClientResult<()> {
        if token.is_empty() {
            return Err(ClientError::MissingToken);
        }
        if self.connected {
            return Ok(());
        }

        self.transport
            .connect(&SocketAuth {
                token: token.to_string(),
            })
            .await?;
        self.connected = true;
        Ok(())
    }

    /// 断开连接并清除状态 (登出)
    pub async fn disconnect(&mut self) {
        if self.connected {
            self.transport.disconnect().await;
            self.connected = false;
        }
    }

    /// 订阅一个订单的房间，返回事件是否真正发出
    pub async fn join_order(&self, order_id: &str) -> ClientResult<bool> {
        self.emit_room_event(JOIN_ORDER, order_id).await
    }

    /// 退订一个订单的房间
    pub async fn leave_order(&self, order_id: &str) -> ClientResult<bool> {
        self.emit_room_event(LEAVE_ORDER, order_id).await
    }

    async fn emit_room_event(&self, event: &str, order_id: &str) -> ClientResult<bool> {
        if !self.connected || order_id.is_empty() {
            debug!(event, order_id, "room event skipped while disconnected");
            return Ok(false);
        }
        self.transport.emit(event, order_id).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use parking_lot::Mutex;

    /// 记录所有传输层调用的内存实现
    #[derive(Clone, Default)]
    struct RecordingTransport {
        connects: Arc<Mutex<Vec<String>>>,
        emits: Arc<Mutex<Vec<(String, String)>>>,
        disconnects: Arc<Mutex<usize>>,
        fail_connect: bool,
    }

    #[async_trait]
    impl SocketTransport for RecordingTransport {
        async fn connect(&self, auth: &SocketAuth) -> ClientResult<()> {
            if self.fail_connect {
                return Err(ClientError::Connection("refused".to_string()));
            }
            self.connects.lock().push(auth.token.clone());
            Ok(())
        }

        async fn emit(&self, event: &str, data: &str) -> ClientResult<()> {
            self.emits.lock().push((event.to_string(), data.to_string()));
            Ok(())
        }

        async fn disconnect(&self) {
            *self.disconnects.lock() += 1;
        }
    }

    #[tokio::test]
    async fn connect_requires_token() {
        let transport = RecordingTransport::default();
        let mut bridge = SocketBridge::new(transport.clone());

        let err = bridge.connect("").await.unwrap_err();
        assert!(matches!(err, ClientError::MissingToken));
        assert!(!bridge.is_connected());
        assert!(transport.connects.lock().is_empty());
    }

    #[tokio::test]
    async fn connect_is_idempotent() {
        let transport = RecordingTransport::default();
        let mut bridge = SocketBridge::new(transport.clone());

        bridge.connect("tok-1").await.expect("first connect failed");
        bridge.connect("tok-2").await.expect("second connect failed");

        // 第二次调用不重复建连
        assert_eq!(*transport.connects.lock(), vec!["tok-1".to_string()]);
        assert!(bridge.is_connected());
    }

    #[tokio::test]
    async fn failed_connect_leaves_bridge_disconnected() {
        let transport = RecordingTransport {
            fail_connect: true,
            ..Default::default()
        };
        let mut bridge = SocketBridge::new(transport.clone());

        assert!(bridge.connect("tok").await.is_err());
        assert!(!bridge.is_connected());
        // 断线状态下房间事件被跳过
        assert!(!bridge.join_order("o-1").await.unwrap());
        assert!(transport.emits.lock().is_empty());
    }

    #[tokio::test]
    async fn disconnect_clears_state_and_is_idempotent() {
        let transport = RecordingTransport::default();
        let mut bridge = SocketBridge::new(transport.clone());

        bridge.connect("tok").await.expect("connect failed");
        bridge.disconnect().await;
        assert!(!bridge.is_connected());

        // 重复登出无害，传输层只收到一次断开
        bridge.disconnect().await;
        assert_eq!(*transport.disconnects.lock(), 1);

        // 断开后可以重新登录建连
        bridge.connect("tok-again").await.expect("reconnect failed");
        assert!(bridge.is_connected());
        assert_eq!(transport.connects.lock().len(), 2);
    }

    #[tokio::test]
    async fn room_events_only_flow_while_connected() {
        let transport = RecordingTransport::default();
        let mut bridge = SocketBridge::new(transport.clone());

        // 未连接：跳过
        assert!(!bridge.join_order("o-1").await.unwrap());

        bridge.connect("tok").await.expect("connect failed");
        assert!(bridge.join_order("o-1").await.unwrap());
        assert!(bridge.leave_order("o-1").await.unwrap());
        // 空订单 ID 不发送
        assert!(!bridge.join_order("").await.unwrap());

        bridge.disconnect().await;
        assert!(!bridge.leave_order("o-1").await.unwrap());

        assert_eq!(
            *transport.emits.lock(),
            vec![
                ("join:order".to_string(), "o-1".to_string()),
                ("leave:order".to_string(), "o-1".to_string()),
            ]
        );
    }
}
