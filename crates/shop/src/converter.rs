//! Order converter: turns a user's cart into a recorded order.

use common::UserId;
use document_store::{Document, DocumentStore, Filter};

use crate::cart::Cart;
use crate::cart_write::{CartWrite, persist_cart};
use crate::collections::ORDERS;
use crate::config::CartWriteMode;
use crate::error::{Result, ShopError};
use crate::order::{Order, UserRef};
use crate::resolution::resolve_cart;
use crate::user::User;

/// Records orders from carts and lists them per user.
///
/// Conversion runs three store round-trips in a fixed order:
/// 1. resolve the cart against the catalog (read only),
/// 2. insert the order,
/// 3. reset the stored cart.
///
/// The store offers no cross-collection transaction, so a failure in step 3
/// leaves a recorded order next to an uncleared cart. That state is reported
/// as [`ShopError::CartReset`] or [`ShopError::CartResetConflict`]; nothing
/// retries it and a retried conversion records a second order.
#[derive(Clone)]
pub struct OrderConverter<S> {
    store: S,
    write_mode: CartWriteMode,
}

impl<S: DocumentStore> OrderConverter<S> {
    /// Creates a converter using last-writer-wins cart resets.
    pub fn new(store: S) -> Self {
        Self::with_write_mode(store, CartWriteMode::default())
    }

    pub fn with_write_mode(store: S, write_mode: CartWriteMode) -> Self {
        Self { store, write_mode }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Converts the user's cart into an order and empties the cart.
    ///
    /// An empty cart produces an order with no items. The in-memory cart is
    /// only cleared once the store has acknowledged the reset.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id()))]
    pub async fn convert_cart_to_order(&self, user: &mut User) -> Result<Order> {
        let started = std::time::Instant::now();

        // 1. Snapshot the cart against live product data
        let resolved = resolve_cart(&self.store, user.cart()).await?;
        let order = Order::new(UserRef::from(&*user), resolved.into_order_items());
        let order_id = order.id();

        // 2. Record the order; the cart is untouched if this fails
        let document = Document::from_serializable(&order)?;
        if let Err(error) = self.store.insert_one(ORDERS, document).await {
            tracing::error!(%error, %order_id, "failed to record order");
            return Err(ShopError::Store(error));
        }
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(%order_id, items = order.items().len(), "order recorded");

        // 3. Reset the cart
        let empty = Cart::new();
        let reset = persist_cart(
            &self.store,
            user.id(),
            user.cart_version(),
            &empty,
            self.write_mode,
        )
        .await;

        match reset {
            Ok(CartWrite::Updated { version }) => {
                user.replace_cart(empty, version);
            }
            Ok(CartWrite::Conflict { expected, actual }) => {
                metrics::counter!("order_cart_reset_failures_total").increment(1);
                tracing::warn!(%order_id, expected, actual, "cart changed before reset");
                return Err(ShopError::CartResetConflict {
                    order_id,
                    expected,
                    actual,
                });
            }
            Err(error) => {
                metrics::counter!("order_cart_reset_failures_total").increment(1);
                tracing::error!(%error, %order_id, "order recorded but cart reset failed");
                return Err(ShopError::CartReset {
                    order_id,
                    source: Box::new(error),
                });
            }
        }

        metrics::histogram!("order_conversion_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        Ok(order)
    }

    /// Lists every order recorded for a user, in store order.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>> {
        let filter = Filter::field("user._id", serde_json::to_value(user_id)?);
        let documents = self.store.find(ORDERS, &filter).await.inspect_err(|error| {
            tracing::error!(%error, "failed to list orders");
        })?;

        let orders = documents
            .into_iter()
            .map(Document::into_typed)
            .collect::<document_store::Result<Vec<Order>>>()?;
        Ok(orders)
    }
}
