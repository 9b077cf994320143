//! 刷新令牌白名单存储

use async_trait::async_trait;
use dashmap::DashSet;

/// 刷新令牌白名单
///
/// 只存令牌本身；过期与归属由 JWT 验签保证。
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// 登记令牌
    async fn insert(&self, token: &str);

    /// 移除令牌，返回其是否曾被登记
    async fn remove(&self, token: &str) -> bool;

    /// 令牌是否在白名单中
    async fn contains(&self, token: &str) -> bool;
}

/// 基于 DashSet 的内存实现
#[derive(Debug, Default)]
pub struct MemoryRefreshTokenStore {
    tokens: DashSet<String>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn insert(&self, token: &str) {
        self.tokens.insert(token.to_string());
    }

    async fn remove(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }

    async fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_contains_remove() {
        let store = MemoryRefreshTokenStore::new();
        assert!(!store.contains("t1").await);

        store.insert("t1").await;
        assert!(store.contains("t1").await);

        assert!(store.remove("t1").await);
        assert!(!store.contains("t1").await);
        assert!(!store.remove("t1").await);
    }
}
