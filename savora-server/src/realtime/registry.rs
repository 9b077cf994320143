//! 连接注册表
//!
//! 维护账户身份到 socket 连接的映射，每个身份最多一条活跃连接。

use dashmap::DashMap;
use shared::models::Role;
use socketioxide::socket::Sid;

use crate::auth::CurrentUser;

/// 连接身份：角色 + 账户 ID
///
/// 顾客和餐厅分属不同命名空间，同一 ID 在两侧互不冲突。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub role: Role,
    pub id: String,
}

impl From<&CurrentUser> for Identity {
    fn from(user: &CurrentUser) -> Self {
        Self {
            role: user.role,
            id: user.id.clone(),
        }
    }
}

/// 身份 → socket 映射
///
/// 后写者获胜：同一身份再次连接会顶掉旧映射。断开时只有当前
/// 持有者才能移除条目，防止旧连接的迟到断开事件清掉新连接。
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<Identity, Sid>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记连接，返回被顶掉的旧 socket (如有)
    pub fn register(&self, identity: Identity, sid: Sid) -> Option<Sid> {
        self.connections.insert(identity, sid)
    }

    /// 查询身份当前的 socket
    pub fn lookup(&self, identity: &Identity) -> Option<Sid> {
        self.connections.get(identity).map(|entry| *entry)
    }

    /// 仅当 `sid` 仍是该身份的当前连接时移除映射
    pub fn remove_if_current(&self, identity: &Identity, sid: Sid) -> bool {
        self.connections
            .remove_if(identity, |_, current| *current == sid)
            .is_some()
    }

    /// 活跃连接数
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: &str) -> Identity {
        Identity {
            role: Role::User,
            id: id.to_string(),
        }
    }

    #[test]
    fn last_writer_wins() {
        let registry = ConnectionRegistry::new();
        let old = Sid::new();
        let new = Sid::new();

        assert_eq!(registry.register(identity("u-1"), old), None);
        assert_eq!(registry.register(identity("u-1"), new), Some(old));
        assert_eq!(registry.lookup(&identity("u-1")), Some(new));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn stale_disconnect_does_not_evict_new_connection() {
        let registry = ConnectionRegistry::new();
        let old = Sid::new();
        let new = Sid::new();

        registry.register(identity("u-1"), old);
        registry.register(identity("u-1"), new);

        // 旧连接的断开事件迟到，不能清掉新映射
        assert!(!registry.remove_if_current(&identity("u-1"), old));
        assert_eq!(registry.lookup(&identity("u-1")), Some(new));

        assert!(registry.remove_if_current(&identity("u-1"), new));
        assert_eq!(registry.lookup(&identity("u-1")), None);
    }

    #[test]
    fn roles_are_separate_namespaces() {
        let registry = ConnectionRegistry::new();
        let user_sid = Sid::new();
        let restaurant_sid = Sid::new();

        registry.register(identity("x-1"), user_sid);
        registry.register(
            Identity {
                role: Role::Restaurant,
                id: "x-1".to_string(),
            },
            restaurant_sid,
        );

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup(&identity("x-1")), Some(user_sid));
    }
}
