//! User entity, its store-bound aggregate and the user repository.

mod aggregate;
mod repository;

pub use aggregate::UserAggregate;
pub use repository::{UserLookup, Users};

use common::UserId;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;

/// A registered user and the cart they own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    id: UserId,

    name: String,

    email: String,

    /// Always present; a stored user without a cart reads back empty.
    #[serde(default)]
    cart: Cart,

    /// Incremented on every cart write.
    #[serde(default)]
    cart_version: u64,
}

impl User {
    /// Creates a user with a fresh identifier and an empty cart.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::construct(name, email, None, None)
    }

    /// Creates a user, defaulting a missing cart to empty and a missing
    /// identifier to a fresh one.
    pub fn construct(
        name: impl Into<String>,
        email: impl Into<String>,
        cart: Option<Cart>,
        id: Option<UserId>,
    ) -> Self {
        Self {
            id: id.unwrap_or_default(),
            name: name.into(),
            email: email.into(),
            cart: cart.unwrap_or_default(),
            cart_version: 0,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Version of the cart as last persisted.
    pub fn cart_version(&self) -> u64 {
        self.cart_version
    }

    pub(crate) fn replace_cart(&mut self, cart: Cart, version: u64) {
        self.cart = cart;
        self.cart_version = version;
    }
}
