//! socket.io 网关装配
//!
//! 握手阶段验证 JWT (握手 `auth.token`)，验证失败直接拒绝连接。
//! 连接建立后登记身份映射，并处理订单房间的订阅/退订。

use socketioxide::SocketIo;
use socketioxide::extract::{Data, Extension, SocketRef, State, TryData};
use socketioxide::handler::ConnectHandler;
use socketioxide::layer::SocketIoLayer;
use thiserror::Error;
use tracing::{debug, info};

use shared::message::{JOIN_ORDER, LEAVE_ORDER, SocketAuth, order_room};

use crate::auth::{CurrentUser, JwtError};
use crate::core::ServerState;
use crate::realtime::Identity;
use crate::security_log;

/// 订单 ID 不会超过这个长度，超长的 join 载荷直接丢弃
const MAX_ORDER_ID_LEN: usize = 128;

/// 握手被拒绝的原因 (会作为 connect_error 送回客户端)
#[derive(Debug, Error)]
enum HandshakeError {
    #[error("authentication token is required")]
    MissingToken,

    #[error("authentication failed")]
    Rejected,
}

/// 构建 socket.io 层并把 `SocketIo` 句柄挂回状态
pub fn layer(state: ServerState) -> SocketIoLayer {
    let (layer, io) = SocketIo::builder().with_state(state.clone()).build_layer();

    io.ns("/", on_connect.with(authenticate));
    state.realtime.attach(io);

    layer
}

/// 握手中间件：无令牌或验证失败都会拒绝连接
async fn authenticate(
    s: SocketRef,
    TryData(auth): TryData<SocketAuth>,
    State(state): State<ServerState>,
) -> Result<(), HandshakeError> {
    let Ok(auth) = auth else {
        security_log!("WARN", "socket_auth_missing", sid = format!("{}", s.id));
        return Err(HandshakeError::MissingToken);
    };

    let user = verify_handshake(&state, &auth.token).map_err(|e| {
        security_log!(
            "WARN",
            "socket_auth_failed",
            sid = format!("{}", s.id),
            error = format!("{}", e)
        );
        HandshakeError::Rejected
    })?;

    s.extensions.insert(user);
    Ok(())
}

/// 握手令牌 → 连接身份。过期/伪造/刷新令牌一律失败。
fn verify_handshake(state: &ServerState, token: &str) -> Result<CurrentUser, JwtError> {
    let claims = state.sessions.verify_access(token)?;
    CurrentUser::try_from(claims)
}

async fn on_connect(
    s: SocketRef,
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) {
    let identity = Identity::from(&user);
    if let Some(displaced) = state.realtime.registry().register(identity, s.id) {
        debug!(sid = %s.id, old_sid = %displaced, "connection replaced for identity");
    }
    info!(sid = %s.id, account = %user.id, role = %user.role, "socket connected");

    s.on(JOIN_ORDER, join_order);
    s.on(LEAVE_ORDER, leave_order);
    s.on_disconnect(on_disconnect);
}

async fn join_order(s: SocketRef, Data(order_id): Data<String>) {
    if order_id.is_empty() || order_id.len() > MAX_ORDER_ID_LEN {
        debug!(sid = %s.id, "ignoring join with malformed order id");
        return;
    }
    s.join(order_room(&order_id));
    debug!(sid = %s.id, order_id, "joined order room");
}

async fn leave_order(s: SocketRef, Data(order_id): Data<String>) {
    if order_id.is_empty() || order_id.len() > MAX_ORDER_ID_LEN {
        return;
    }
    s.leave(order_room(&order_id));
    debug!(sid = %s.id, order_id, "left order room");
}

async fn on_disconnect(
    s: SocketRef,
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) {
    let identity = Identity::from(&user);
    // 只清理仍然指向本连接的映射，避免误删同身份的新连接
    let removed = state.realtime.registry().remove_if_current(&identity, s.id);
    debug!(sid = %s.id, account = %user.id, removed, "socket disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use crate::core::Config;
    use shared::models::Role;

    async fn test_state(access_minutes: i64) -> ServerState {
        let config = Config {
            http_port: 0,
            cors_origin: "http://localhost:5173".to_string(),
            jwt: JwtConfig {
                access_secret: "gateway-access-secret-32-chars-long!!!".to_string(),
                refresh_secret: "gateway-refresh-secret-32-chars-long!!".to_string(),
                access_minutes,
                refresh_days: 7,
                issuer: "savora-server".to_string(),
                audience: "savora-clients".to_string(),
            },
            environment: "test".to_string(),
        };
        ServerState::initialize(&config).await
    }

    #[tokio::test]
    async fn expired_token_is_rejected_and_registry_stays_empty() {
        // 负有效期签出的令牌早已过期 (超出验签的宽限窗口)
        let state = test_state(-5).await;
        let pair = state
            .sessions
            .issue("u-1", "a@b.com", Role::User)
            .await
            .expect("issue failed");

        let err = verify_handshake(&state, &pair.access_token).unwrap_err();
        assert!(matches!(err, JwtError::ExpiredToken));
        assert_eq!(state.realtime.connection_count(), 0);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let state = test_state(15).await;
        assert!(verify_handshake(&state, "not-a-jwt").is_err());
        assert!(verify_handshake(&state, "").is_err());
        assert_eq!(state.realtime.connection_count(), 0);
    }

    #[tokio::test]
    async fn refresh_token_cannot_open_a_socket() {
        let state = test_state(15).await;
        let pair = state
            .sessions
            .issue("u-1", "a@b.com", Role::User)
            .await
            .expect("issue failed");

        assert!(verify_handshake(&state, &pair.refresh_token).is_err());
    }

    #[tokio::test]
    async fn valid_token_yields_connection_identity() {
        let state = test_state(15).await;
        let pair = state
            .sessions
            .issue("r-7", "resto@example.com", Role::Restaurant)
            .await
            .expect("issue failed");

        let user = verify_handshake(&state, &pair.access_token).expect("handshake failed");
        assert_eq!(user.id, "r-7");
        assert_eq!(user.role, Role::Restaurant);
    }
}
