//! Account models
//!
//! Users and restaurants share one account namespace per role. Public
//! views never carry the password hash; the hash only lives in the
//! server-side records.

use serde::{Deserialize, Serialize};

/// Account role
///
/// Determines which side of the platform an account belongs to and
/// which orders it can see (`user` = owner, `restaurant` = target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Restaurant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Restaurant => "restaurant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "restaurant" => Ok(Role::Restaurant),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// Error returned when a role string is neither `user` nor `restaurant`
#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

/// Loyalty-coin balance for one user↔restaurant relationship
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CoinBalance {
    pub restaurant_id: String,
    pub coins: i64,
}

/// Public view of a user account (no secret)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    pub coin_balances: Vec<CoinBalance>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Public view of a restaurant account (no secret)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPublic {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    pub role: Role,
    /// Coins earned per currency unit spent
    pub coin_rate: i64,
    /// Coins required to unlock a reward
    pub coin_threshold: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
