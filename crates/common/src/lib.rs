//! Identifier types shared by the document store and the shop core.

mod types;

pub use types::{DocumentId, OrderId, ProductId, UserId};
