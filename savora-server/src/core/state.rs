use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::{JwtService, SessionService};
use crate::core::Config;
use crate::realtime::RealtimeService;
use crate::store::{
    AccountStore, MemoryAccountStore, MemoryOrderStore, MemoryRefreshTokenStore, OrderStore,
};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，克隆成本极低。存储层以 trait 对象注入，
/// 实现可以整体替换而不触及 handler。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | accounts | Arc<dyn AccountStore> | 账户与菜单存储 |
/// | orders | Arc<dyn OrderStore> | 订单存储 |
/// | sessions | Arc<SessionService> | 会话服务 (令牌签发/轮换/吊销) |
/// | realtime | RealtimeService | socket.io 事件服务 |
/// | started_at | DateTime<Utc> | 进程启动时间 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 账户存储
    pub accounts: Arc<dyn AccountStore>,
    /// 订单存储
    pub orders: Arc<dyn OrderStore>,
    /// 会话服务
    pub sessions: Arc<SessionService>,
    /// 实时事件服务
    pub realtime: RealtimeService,
    /// 启动时间
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`initialize()`](Self::initialize) 代替；测试中可以
    /// 注入自定义存储实现。
    pub fn new(
        config: Config,
        accounts: Arc<dyn AccountStore>,
        orders: Arc<dyn OrderStore>,
        sessions: Arc<SessionService>,
    ) -> Self {
        Self {
            config,
            accounts,
            orders,
            sessions,
            realtime: RealtimeService::new(),
            started_at: Utc::now(),
        }
    }

    /// 使用内存存储初始化完整状态
    pub async fn initialize(config: &Config) -> Self {
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
        let sessions = Arc::new(SessionService::new(
            jwt,
            Arc::new(MemoryRefreshTokenStore::new()),
        ));

        Self::new(
            config.clone(),
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemoryOrderStore::new()),
            sessions,
        )
    }

    /// 进程运行秒数
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }

    /// 向相关客户端广播订单事件
    pub async fn emit_order_event(&self, event: &str, payload: &shared::OrderEventPayload) {
        self.realtime.emit_order_event(event, payload).await;
    }
}
