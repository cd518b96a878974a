//! Shop error types.

use common::{OrderId, UserId};
use document_store::StoreError;
use thiserror::Error;

use crate::cart::CartError;

/// Errors that can occur in cart and order operations.
#[derive(Debug, Error)]
pub enum ShopError {
    /// A persistence operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The bulk product lookup behind cart resolution failed.
    #[error("Cart resolution failed: {0}")]
    Resolution(#[source] StoreError),

    /// A cart mutation was rejected before any write.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// The user document does not exist in the store.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// The order was recorded but clearing the cart failed.
    ///
    /// The order is durable and the stored cart still holds the converted
    /// lines until something reconciles them.
    #[error("Order {order_id} was recorded but the cart was not reset: {source}")]
    CartReset {
        order_id: OrderId,
        source: Box<ShopError>,
    },

    /// The order was recorded but the cart changed concurrently, so it was
    /// left in place.
    #[error(
        "Order {order_id} was recorded but the cart changed concurrently: expected version {expected}, found {actual}"
    )]
    CartResetConflict {
        order_id: OrderId,
        expected: u64,
        actual: u64,
    },

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShopError {
    /// The order that was already recorded, for conversions that failed
    /// after the insert.
    pub fn recorded_order(&self) -> Option<OrderId> {
        match self {
            ShopError::CartReset { order_id, .. }
            | ShopError::CartResetConflict { order_id, .. } => Some(*order_id),
            _ => None,
        }
    }
}

/// Convenience type alias for shop results.
pub type Result<T> = std::result::Result<T, ShopError>;
