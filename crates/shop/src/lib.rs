//! Cart and order consistency core.
//!
//! This crate provides:
//! - a cart engine that merges lines per product and persists the whole cart
//! - cart resolution against the product catalog with one bulk lookup
//! - an order converter that records an order and then resets the cart
//! - a user aggregate binding identity, cart and store together
//!
//! Every component receives its [`DocumentStore`](document_store::DocumentStore)
//! explicitly; nothing here holds a global handle.

pub mod cart;
mod cart_write;
pub mod config;
pub mod converter;
pub mod error;
pub mod order;
pub mod product;
pub mod resolution;
pub mod user;

/// Collection names used by the core.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PRODUCTS: &str = "products";
    pub const ORDERS: &str = "orders";
}

pub use cart::{Cart, CartError, CartLine};
pub use cart_write::CartWrite;
pub use config::{CartWriteMode, LogFormat, ShopConfig};
pub use converter::OrderConverter;
pub use error::{Result, ShopError};
pub use order::{Order, OrderItem, UserRef};
pub use product::Product;
pub use resolution::{ResolvedCart, ResolvedLine, resolve_cart};
pub use user::{User, UserAggregate, UserLookup, Users};
