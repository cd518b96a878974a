//! Whole-cart persistence shared by the user aggregate and the order converter.

use common::UserId;
use document_store::{DocumentStore, DocumentStoreExt, Filter, UpdatePatch};
use serde_json::json;

use crate::cart::Cart;
use crate::collections::USERS;
use crate::config::CartWriteMode;
use crate::error::{Result, ShopError};

pub(crate) const CART_FIELD: &str = "cart";
pub(crate) const CART_VERSION_FIELD: &str = "cart_version";

/// Outcome of a cart write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartWrite {
    /// The cart was replaced and now carries `version`.
    Updated { version: u64 },

    /// Another writer changed the cart first; nothing was written.
    Conflict { expected: u64, actual: u64 },
}

impl CartWrite {
    pub fn is_updated(&self) -> bool {
        matches!(self, CartWrite::Updated { .. })
    }
}

/// Replaces the stored cart field with `cart` in one `$set`.
///
/// In [`CartWriteMode::Versioned`] the write is guarded by the version the
/// caller last saw; a mismatch yields [`CartWrite::Conflict`].
pub(crate) async fn persist_cart<S>(
    store: &S,
    user_id: UserId,
    current_version: u64,
    cart: &Cart,
    mode: CartWriteMode,
) -> Result<CartWrite>
where
    S: DocumentStore + ?Sized,
{
    let next_version = current_version + 1;
    let filter = match mode {
        CartWriteMode::LastWriterWins => Filter::by_id(user_id),
        CartWriteMode::Versioned => {
            Filter::by_id(user_id).field_eq(CART_VERSION_FIELD, json!(current_version))
        }
    };
    let patch = UpdatePatch::set(CART_FIELD, cart)?.and_set(CART_VERSION_FIELD, &next_version)?;

    let ack = store.update_one(USERS, &filter, &patch).await?;
    if ack.is_matched() {
        return Ok(CartWrite::Updated {
            version: next_version,
        });
    }

    if mode == CartWriteMode::LastWriterWins {
        return Err(ShopError::UserNotFound(user_id));
    }

    // The guarded write missed: either the user is gone or the version moved.
    let stored = store
        .find_by_id(USERS, user_id.into())
        .await?
        .ok_or(ShopError::UserNotFound(user_id))?;

    Ok(CartWrite::Conflict {
        expected: current_version,
        actual: stored
            .get(CART_VERSION_FIELD)
            .and_then(serde_json::Value::as_u64)
            .unwrap_or_default(),
    })
}
