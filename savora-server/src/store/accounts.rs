//! 账户存储
//!
//! 顾客账户和餐厅账户分属两个命名空间，同一邮箱可以在两侧各注册一次。
//! 密码哈希只存在于服务端记录中，公开视图从不携带。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use shared::coin::{DEFAULT_COIN_RATE, DEFAULT_COIN_THRESHOLD};
use shared::models::{
    CoinBalance, MenuItem, MenuItemCreate, MenuItemUpdate, RestaurantPublic, Role, UserPublic,
};
use uuid::Uuid;

use super::{StoreError, StoreResult};
use shared::client::{ProfileUpdateRequest, RegisterRestaurantRequest, RegisterUserRequest};

// ========== Records ==========

/// 顾客账户记录 (服务端内部，含密码哈希)
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub coin_balances: Vec<CoinBalance>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        verify_password(&self.password_hash, password)
    }

    /// 公开视图 (无密码哈希)
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            role: Role::User,
            coin_balances: self.coin_balances.clone(),
            created_at: self.created_at,
        }
    }
}

/// 餐厅账户记录 (服务端内部，含密码哈希和菜单)
#[derive(Debug, Clone)]
pub struct RestaurantRecord {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cuisine: Option<String>,
    pub coin_rate: i64,
    pub coin_threshold: i64,
    pub menu: Vec<MenuItem>,
    pub created_at: DateTime<Utc>,
}

impl RestaurantRecord {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        verify_password(&self.password_hash, password)
    }

    /// 公开视图 (无密码哈希、无菜单)
    pub fn to_public(&self) -> RestaurantPublic {
        RestaurantPublic {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            cuisine: self.cuisine.clone(),
            role: Role::Restaurant,
            coin_rate: self.coin_rate,
            coin_threshold: self.coin_threshold,
            created_at: self.created_at,
        }
    }
}

/// Hash password using argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

fn verify_password(hash: &str, password: &str) -> Result<bool, argon2::password_hash::Error> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHash, PasswordVerifier},
    };

    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

// ========== Trait ==========

/// 账户存储接口
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// 注册顾客账户。`password_hash` 由调用方哈希完成。
    async fn create_user(
        &self,
        req: &RegisterUserRequest,
        password_hash: String,
    ) -> StoreResult<UserRecord>;

    /// 注册餐厅账户
    async fn create_restaurant(
        &self,
        req: &RegisterRestaurantRequest,
        password_hash: String,
    ) -> StoreResult<RestaurantRecord>;

    async fn find_user_by_email(&self, email: &str) -> Option<UserRecord>;
    async fn find_restaurant_by_email(&self, email: &str) -> Option<RestaurantRecord>;

    async fn find_user(&self, id: &str) -> Option<UserRecord>;
    async fn find_restaurant(&self, id: &str) -> Option<RestaurantRecord>;

    /// 店面列表 (公开视图)
    async fn list_restaurants(&self) -> Vec<RestaurantPublic>;

    /// 更新餐厅资料 (部分更新)
    async fn update_restaurant_profile(
        &self,
        id: &str,
        update: &ProfileUpdateRequest,
    ) -> StoreResult<RestaurantRecord>;

    /// 给顾客在某餐厅的金币余额加上 `delta`，返回新余额
    async fn credit_coins(
        &self,
        user_id: &str,
        restaurant_id: &str,
        delta: i64,
    ) -> StoreResult<i64>;

    // ---- 菜单 ----

    async fn list_menu(&self, restaurant_id: &str) -> StoreResult<Vec<MenuItem>>;
    async fn add_menu_item(
        &self,
        restaurant_id: &str,
        item: &MenuItemCreate,
    ) -> StoreResult<MenuItem>;
    async fn update_menu_item(
        &self,
        restaurant_id: &str,
        item_id: &str,
        update: &MenuItemUpdate,
    ) -> StoreResult<MenuItem>;
    async fn remove_menu_item(&self, restaurant_id: &str, item_id: &str) -> StoreResult<()>;
}

// ========== In-memory implementation ==========

/// 基于 DashMap 的内存账户存储
///
/// 邮箱唯一性靠 `DashSet` 预占实现：`insert` 返回 false 即已被占用，
/// 并发注册同一邮箱时恰好一个成功。
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    users: DashMap<String, UserRecord>,
    restaurants: DashMap<String, RestaurantRecord>,
    user_emails: DashSet<String>,
    restaurant_emails: DashSet<String>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_user(
        &self,
        req: &RegisterUserRequest,
        password_hash: String,
    ) -> StoreResult<UserRecord> {
        // 先占邮箱再写记录
        if !self.user_emails.insert(req.email.clone()) {
            return Err(StoreError::DuplicateEmail(req.email.clone()));
        }

        let record = UserRecord {
            id: format!("u-{}", Uuid::new_v4()),
            email: req.email.clone(),
            password_hash,
            name: req.name.clone(),
            phone: req.phone.clone(),
            coin_balances: Vec::new(),
            created_at: Utc::now(),
        };
        self.users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn create_restaurant(
        &self,
        req: &RegisterRestaurantRequest,
        password_hash: String,
    ) -> StoreResult<RestaurantRecord> {
        if !self.restaurant_emails.insert(req.email.clone()) {
            return Err(StoreError::DuplicateEmail(req.email.clone()));
        }

        let record = RestaurantRecord {
            id: format!("r-{}", Uuid::new_v4()),
            email: req.email.clone(),
            password_hash,
            name: req.name.clone(),
            phone: req.phone.clone(),
            address: req.address.clone(),
            cuisine: req.cuisine.clone(),
            coin_rate: DEFAULT_COIN_RATE,
            coin_threshold: DEFAULT_COIN_THRESHOLD,
            menu: Vec::new(),
            created_at: Utc::now(),
        };
        self.restaurants.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> Option<UserRecord> {
        self.users
            .iter()
            .find(|r| r.email == email)
            .map(|r| r.clone())
    }

    async fn find_restaurant_by_email(&self, email: &str) -> Option<RestaurantRecord> {
        self.restaurants
            .iter()
            .find(|r| r.email == email)
            .map(|r| r.clone())
    }

    async fn find_user(&self, id: &str) -> Option<UserRecord> {
        self.users.get(id).map(|r| r.clone())
    }

    async fn find_restaurant(&self, id: &str) -> Option<RestaurantRecord> {
        self.restaurants.get(id).map(|r| r.clone())
    }

    async fn list_restaurants(&self) -> Vec<RestaurantPublic> {
        let mut list: Vec<RestaurantPublic> =
            self.restaurants.iter().map(|r| r.to_public()).collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        list
    }

    async fn update_restaurant_profile(
        &self,
        id: &str,
        update: &ProfileUpdateRequest,
    ) -> StoreResult<RestaurantRecord> {
        let mut record = self
            .restaurants
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("restaurant {id}")))?;

        if let Some(name) = &update.name {
            record.name = name.clone();
        }
        if let Some(phone) = &update.phone {
            record.phone = Some(phone.clone());
        }
        if let Some(address) = &update.address {
            record.address = Some(address.clone());
        }
        if let Some(cuisine) = &update.cuisine {
            record.cuisine = Some(cuisine.clone());
        }
        if let Some(coin_rate) = update.coin_rate {
            record.coin_rate = coin_rate;
        }
        if let Some(coin_threshold) = update.coin_threshold {
            record.coin_threshold = coin_threshold;
        }

        Ok(record.clone())
    }

    async fn credit_coins(
        &self,
        user_id: &str,
        restaurant_id: &str,
        delta: i64,
    ) -> StoreResult<i64> {
        let mut user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {user_id}")))?;

        if let Some(balance) = user
            .coin_balances
            .iter_mut()
            .find(|b| b.restaurant_id == restaurant_id)
        {
            balance.coins += delta;
            Ok(balance.coins)
        } else {
            user.coin_balances.push(CoinBalance {
                restaurant_id: restaurant_id.to_string(),
                coins: delta,
            });
            Ok(delta)
        }
    }

    async fn list_menu(&self, restaurant_id: &str) -> StoreResult<Vec<MenuItem>> {
        let record = self
            .restaurants
            .get(restaurant_id)
            .ok_or_else(|| StoreError::NotFound(format!("restaurant {restaurant_id}")))?;
        Ok(record.menu.clone())
    }

    async fn add_menu_item(
        &self,
        restaurant_id: &str,
        item: &MenuItemCreate,
    ) -> StoreResult<MenuItem> {
        let mut record = self
            .restaurants
            .get_mut(restaurant_id)
            .ok_or_else(|| StoreError::NotFound(format!("restaurant {restaurant_id}")))?;

        let menu_item = MenuItem {
            id: format!("m-{}", Uuid::new_v4()),
            restaurant_id: restaurant_id.to_string(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            available: item.available,
        };
        record.menu.push(menu_item.clone());
        Ok(menu_item)
    }

    async fn update_menu_item(
        &self,
        restaurant_id: &str,
        item_id: &str,
        update: &MenuItemUpdate,
    ) -> StoreResult<MenuItem> {
        let mut record = self
            .restaurants
            .get_mut(restaurant_id)
            .ok_or_else(|| StoreError::NotFound(format!("restaurant {restaurant_id}")))?;

        let item = record
            .menu
            .iter_mut()
            .find(|m| m.id == item_id)
            .ok_or_else(|| StoreError::NotFound(format!("menu item {item_id}")))?;

        if let Some(name) = &update.name {
            item.name = name.clone();
        }
        if let Some(description) = &update.description {
            item.description = Some(description.clone());
        }
        if let Some(price) = update.price {
            item.price = price;
        }
        if let Some(available) = update.available {
            item.available = available;
        }

        Ok(item.clone())
    }

    async fn remove_menu_item(&self, restaurant_id: &str, item_id: &str) -> StoreResult<()> {
        let mut record = self
            .restaurants
            .get_mut(restaurant_id)
            .ok_or_else(|| StoreError::NotFound(format!("restaurant {restaurant_id}")))?;

        let before = record.menu.len();
        record.menu.retain(|m| m.id != item_id);
        if record.menu.len() == before {
            return Err(StoreError::NotFound(format!("menu item {item_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn user_req(email: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            email: email.to_string(),
            password: "secret123".to_string(),
            name: "John".to_string(),
            phone: None,
        }
    }

    fn restaurant_req(email: &str) -> RegisterRestaurantRequest {
        RegisterRestaurantRequest {
            email: email.to_string(),
            password: "secret123".to_string(),
            name: "Trattoria".to_string(),
            phone: None,
            address: Some("1 Main St".to_string()),
            cuisine: Some("italian".to_string()),
        }
    }

    #[tokio::test]
    async fn duplicate_email_within_namespace_is_rejected() {
        let store = MemoryAccountStore::new();
        store
            .create_user(&user_req("a@b.com"), "hash".to_string())
            .await
            .expect("first registration failed");
        let err = store
            .create_user(&user_req("a@b.com"), "hash".to_string())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail("a@b.com".to_string()));
    }

    #[tokio::test]
    async fn concurrent_registrations_with_same_email_succeed_exactly_once() {
        use std::sync::Arc;

        let store = Arc::new(MemoryAccountStore::new());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create_user(&user_req("race@b.com"), "hash".to_string()).await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            if handle.await.expect("task panicked").is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert!(store.find_user_by_email("race@b.com").await.is_some());
    }

    #[tokio::test]
    async fn same_email_across_namespaces_is_allowed() {
        let store = MemoryAccountStore::new();
        store
            .create_user(&user_req("a@b.com"), "hash".to_string())
            .await
            .expect("user registration failed");
        store
            .create_restaurant(&restaurant_req("a@b.com"), "hash".to_string())
            .await
            .expect("restaurant registration failed");
    }

    #[tokio::test]
    async fn new_restaurant_gets_default_coin_settings() {
        let store = MemoryAccountStore::new();
        let r = store
            .create_restaurant(&restaurant_req("r@b.com"), "hash".to_string())
            .await
            .expect("registration failed");
        assert_eq!(r.coin_rate, DEFAULT_COIN_RATE);
        assert_eq!(r.coin_threshold, DEFAULT_COIN_THRESHOLD);
    }

    #[tokio::test]
    async fn credit_coins_accumulates_per_restaurant() {
        let store = MemoryAccountStore::new();
        let user = store
            .create_user(&user_req("a@b.com"), "hash".to_string())
            .await
            .expect("registration failed");

        assert_eq!(store.credit_coins(&user.id, "r-1", 50).await.unwrap(), 50);
        assert_eq!(store.credit_coins(&user.id, "r-1", 75).await.unwrap(), 125);
        assert_eq!(store.credit_coins(&user.id, "r-2", 10).await.unwrap(), 10);

        let fresh = store.find_user(&user.id).await.unwrap();
        assert_eq!(fresh.coin_balances.len(), 2);
    }

    #[tokio::test]
    async fn menu_crud() {
        let store = MemoryAccountStore::new();
        let r = store
            .create_restaurant(&restaurant_req("r@b.com"), "hash".to_string())
            .await
            .expect("registration failed");

        let created = store
            .add_menu_item(
                &r.id,
                &MenuItemCreate {
                    name: "Margherita".to_string(),
                    description: None,
                    price: Decimal::new(1250, 2),
                    available: true,
                },
            )
            .await
            .expect("add failed");

        let updated = store
            .update_menu_item(
                &r.id,
                &created.id,
                &MenuItemUpdate {
                    price: Some(Decimal::new(1350, 2)),
                    available: Some(false),
                    ..Default::default()
                },
            )
            .await
            .expect("update failed");
        assert_eq!(updated.price, Decimal::new(1350, 2));
        assert!(!updated.available);

        store
            .remove_menu_item(&r.id, &created.id)
            .await
            .expect("remove failed");
        assert!(store.list_menu(&r.id).await.unwrap().is_empty());
        assert!(store.remove_menu_item(&r.id, &created.id).await.is_err());
    }

    #[tokio::test]
    async fn profile_update_is_partial() {
        let store = MemoryAccountStore::new();
        let r = store
            .create_restaurant(&restaurant_req("r@b.com"), "hash".to_string())
            .await
            .expect("registration failed");

        let updated = store
            .update_restaurant_profile(
                &r.id,
                &ProfileUpdateRequest {
                    coin_rate: Some(10),
                    ..Default::default()
                },
            )
            .await
            .expect("update failed");

        assert_eq!(updated.coin_rate, 10);
        assert_eq!(updated.name, "Trattoria");
        assert_eq!(updated.cuisine.as_deref(), Some("italian"));
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter22").expect("hash failed");
        let record = UserRecord {
            id: "u-1".to_string(),
            email: "a@b.com".to_string(),
            password_hash: hash,
            name: "John".to_string(),
            phone: None,
            coin_balances: Vec::new(),
            created_at: Utc::now(),
        };
        assert!(record.verify_password("hunter22").unwrap());
        assert!(!record.verify_password("wrong").unwrap());
    }

    #[test]
    fn public_views_have_no_secret() {
        let json = serde_json::to_value(
            UserRecord {
                id: "u-1".to_string(),
                email: "a@b.com".to_string(),
                password_hash: "$argon2$secret".to_string(),
                name: "John".to_string(),
                phone: None,
                coin_balances: Vec::new(),
                created_at: Utc::now(),
            }
            .to_public(),
        )
        .unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
