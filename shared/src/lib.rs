//! Shared types for the Savora food-ordering platform
//!
//! Common types used by the server and clients: domain models,
//! API request/response DTOs, realtime event payloads and the
//! coin/reward arithmetic.

pub mod client;
pub mod coin;
pub mod message;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Realtime re-exports (for convenient access)
pub use message::{OrderEventPayload, SocketAuth, order_room};

// Model re-exports
pub use models::{LineItem, MenuItem, Order, OrderStatus, Role};
