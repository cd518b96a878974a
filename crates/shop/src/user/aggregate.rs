//! Store-bound user aggregate.

use common::{ProductId, UserId};
use document_store::{Document, DocumentStore, DocumentStoreExt};

use crate::cart::Cart;
use crate::cart_write::{CartWrite, persist_cart};
use crate::collections::USERS;
use crate::config::CartWriteMode;
use crate::converter::OrderConverter;
use crate::error::{Result, ShopError};
use crate::order::Order;
use crate::product::Product;
use crate::resolution::{ResolvedCart, resolve_cart};

use super::User;

/// A user bound to the store that persists it.
///
/// Cart operations compute the new cart first and adopt it only after the
/// store acknowledges the write, so a failed write leaves the in-memory cart
/// at its last persisted state. Concurrent aggregates for the same user are
/// not coordinated: in last-writer-wins mode the later full-cart write
/// replaces the earlier one.
pub struct UserAggregate<S> {
    user: User,
    store: S,
    orders: OrderConverter<S>,
    write_mode: CartWriteMode,
}

impl<S: DocumentStore + Clone> UserAggregate<S> {
    /// Binds a user to a store.
    pub fn new(user: User, store: S, write_mode: CartWriteMode) -> Self {
        let orders = OrderConverter::with_write_mode(store.clone(), write_mode);
        Self {
            user,
            store,
            orders,
            write_mode,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn into_user(self) -> User {
        self.user
    }

    pub fn id(&self) -> UserId {
        self.user.id()
    }

    pub fn cart(&self) -> &Cart {
        self.user.cart()
    }

    /// Inserts the user as a new document.
    #[tracing::instrument(skip(self), fields(user_id = %self.user.id()))]
    pub async fn persist_new(&self) -> Result<UserId> {
        let document = Document::from_serializable(&self.user)?;
        let id = self
            .store
            .insert_one(USERS, document)
            .await
            .inspect_err(|error| tracing::error!(%error, "failed to insert user"))?;

        tracing::info!("user persisted");
        Ok(id.into())
    }

    /// Adds one unit of a product to the cart.
    pub async fn add_one(&mut self, product: &Product) -> Result<CartWrite> {
        self.add_line(product, 1).await
    }

    /// Adds `quantity` of a product, merging into an existing line.
    ///
    /// The product is not checked against the catalog.
    #[tracing::instrument(skip(self, product), fields(user_id = %self.user.id(), product_id = %product.id()))]
    pub async fn add_line(&mut self, product: &Product, quantity: u32) -> Result<CartWrite> {
        let cart = self.user.cart().with_line_added(product.id(), quantity)?;
        let outcome = self.write_cart(cart).await?;
        if outcome.is_updated() {
            metrics::counter!("cart_lines_added_total").increment(1);
        }
        Ok(outcome)
    }

    /// Removes a product's line. A missing product still rewrites the cart.
    #[tracing::instrument(skip(self), fields(user_id = %self.user.id()))]
    pub async fn remove_line(&mut self, product_id: ProductId) -> Result<CartWrite> {
        let cart = self.user.cart().without_line(product_id);
        let outcome = self.write_cart(cart).await?;
        if outcome.is_updated() {
            metrics::counter!("cart_lines_removed_total").increment(1);
        }
        Ok(outcome)
    }

    /// Decrements a product's quantity, removing the line at zero.
    #[tracing::instrument(skip(self), fields(user_id = %self.user.id()))]
    pub async fn reduce_line(&mut self, product_id: ProductId, by: u32) -> Result<CartWrite> {
        let cart = self.user.cart().with_line_reduced(product_id, by)?;
        self.write_cart(cart).await
    }

    /// Materializes the cart against live product data.
    #[tracing::instrument(skip(self), fields(user_id = %self.user.id()))]
    pub async fn resolve_cart(&self) -> Result<ResolvedCart> {
        resolve_cart(&self.store, self.user.cart()).await
    }

    /// Records the cart as an order and empties it.
    pub async fn convert_cart_to_order(&mut self) -> Result<Order> {
        self.orders.convert_cart_to_order(&mut self.user).await
    }

    /// Lists this user's orders.
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        self.orders.list_orders(self.user.id()).await
    }

    /// Reloads the user from the store, e.g. after a cart write conflict.
    #[tracing::instrument(skip(self), fields(user_id = %self.user.id()))]
    pub async fn refresh(&mut self) -> Result<()> {
        let id = self.user.id();
        let document = self
            .store
            .find_by_id(USERS, id.into())
            .await
            .inspect_err(|error| tracing::error!(%error, "failed to reload user"))?
            .ok_or(ShopError::UserNotFound(id))?;

        self.user = document.into_typed()?;
        Ok(())
    }

    async fn write_cart(&mut self, cart: Cart) -> Result<CartWrite> {
        let outcome = persist_cart(
            &self.store,
            self.user.id(),
            self.user.cart_version(),
            &cart,
            self.write_mode,
        )
        .await
        .inspect_err(|error| tracing::error!(%error, "cart write failed"))?;

        match outcome {
            CartWrite::Updated { version } => self.user.replace_cart(cart, version),
            CartWrite::Conflict { expected, actual } => {
                metrics::counter!("cart_write_conflicts_total").increment(1);
                tracing::warn!(expected, actual, "cart write conflict");
            }
        }

        Ok(outcome)
    }
}
