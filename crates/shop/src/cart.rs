//! Cart engine: the in-memory cart and its merge/removal algorithms.
//!
//! Every mutation returns a new [`Cart`] rather than editing in place, so the
//! owning user only adopts a cart after the store has acknowledged it.

use std::num::NonZeroU32;

use common::ProductId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by cart mutations before anything is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantities added or removed must be at least 1.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// The merged quantity does not fit in a `u32`.
    #[error("Quantity overflow for product {product_id}: {current} + {requested}")]
    QuantityOverflow {
        product_id: ProductId,
        current: u32,
        requested: u32,
    },
}

/// One product in a cart with a positive quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    product_id: ProductId,
    quantity: NonZeroU32,
}

impl CartLine {
    /// Creates a line for a product.
    pub fn new(product_id: ProductId, quantity: NonZeroU32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }

    /// The product this line refers to.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// The line quantity, always at least 1.
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }
}

/// A user's cart: an ordered list of lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    items: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from `(product, quantity)` pairs, merging repeated products.
    pub fn from_lines(
        lines: impl IntoIterator<Item = (ProductId, u32)>,
    ) -> Result<Self, CartError> {
        lines
            .into_iter()
            .try_fold(Cart::new(), |cart, (product_id, quantity)| {
                cart.with_line_added(product_id, quantity)
            })
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.items
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the line for a product, if present.
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.items.iter().find(|l| l.product_id == product_id)
    }

    /// Quantity of a product, 0 when absent.
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.line(product_id).map_or(0, CartLine::quantity)
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity())).sum()
    }

    /// Product identifiers in line order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(CartLine::product_id).collect()
    }

    /// Merges `quantity` of a product into the cart.
    ///
    /// An existing line is incremented in place; otherwise a new line is
    /// appended at the end.
    pub fn with_line_added(&self, product_id: ProductId, quantity: u32) -> Result<Cart, CartError> {
        let requested = NonZeroU32::new(quantity).ok_or(CartError::InvalidQuantity { quantity })?;

        let mut items = self.items.clone();
        match items.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                let current = line.quantity();
                line.quantity =
                    line.quantity
                        .checked_add(quantity)
                        .ok_or(CartError::QuantityOverflow {
                            product_id,
                            current,
                            requested: quantity,
                        })?;
            }
            None => items.push(CartLine::new(product_id, requested)),
        }

        Ok(Cart { items })
    }

    /// Returns the cart without the given product. Absent products are a no-op.
    pub fn without_line(&self, product_id: ProductId) -> Cart {
        Cart {
            items: self
                .items
                .iter()
                .filter(|l| l.product_id != product_id)
                .copied()
                .collect(),
        }
    }

    /// Decrements a line by `by`, dropping it once it reaches zero.
    pub fn with_line_reduced(&self, product_id: ProductId, by: u32) -> Result<Cart, CartError> {
        if by == 0 {
            return Err(CartError::InvalidQuantity { quantity: by });
        }

        let items = self
            .items
            .iter()
            .filter_map(|line| {
                if line.product_id != product_id {
                    return Some(*line);
                }
                NonZeroU32::new(line.quantity().saturating_sub(by))
                    .map(|quantity| CartLine::new(product_id, quantity))
            })
            .collect();

        Ok(Cart { items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(cart: &Cart) -> Vec<(ProductId, u32)> {
        cart.lines()
            .iter()
            .map(|l| (l.product_id(), l.quantity()))
            .collect()
    }

    #[test]
    fn adding_new_product_appends_line() {
        let a = ProductId::new();
        let cart = Cart::new().with_line_added(a, 1).unwrap();
        assert_eq!(pairs(&cart), vec![(a, 1)]);
    }

    #[test]
    fn adding_existing_product_merges() {
        let a = ProductId::new();
        let b = ProductId::new();
        let cart = Cart::new()
            .with_line_added(a, 1)
            .unwrap()
            .with_line_added(b, 1)
            .unwrap()
            .with_line_added(a, 3)
            .unwrap();

        assert_eq!(pairs(&cart), vec![(a, 4), (b, 1)]);
    }

    #[test]
    fn add_does_not_touch_the_original() {
        let a = ProductId::new();
        let original = Cart::new().with_line_added(a, 1).unwrap();
        let _ = original.with_line_added(a, 1).unwrap();
        assert_eq!(original.quantity_of(a), 1);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let result = Cart::new().with_line_added(ProductId::new(), 0);
        assert_eq!(result, Err(CartError::InvalidQuantity { quantity: 0 }));
    }

    #[test]
    fn overflow_is_rejected() {
        let a = ProductId::new();
        let cart = Cart::new().with_line_added(a, u32::MAX).unwrap();
        let result = cart.with_line_added(a, 1);
        assert!(matches!(result, Err(CartError::QuantityOverflow { .. })));
    }

    #[test]
    fn remove_drops_only_the_target() {
        let a = ProductId::new();
        let b = ProductId::new();
        let cart = Cart::from_lines([(a, 2), (b, 1)]).unwrap();

        let cart = cart.without_line(a);
        assert_eq!(pairs(&cart), vec![(b, 1)]);
    }

    #[test]
    fn remove_missing_product_is_noop() {
        let a = ProductId::new();
        let cart = Cart::from_lines([(a, 2)]).unwrap();
        assert_eq!(cart.without_line(ProductId::new()), cart);
    }

    #[test]
    fn reduce_to_zero_removes_line() {
        let a = ProductId::new();
        let b = ProductId::new();
        let cart = Cart::from_lines([(a, 2), (b, 5)]).unwrap();

        let cart = cart.with_line_reduced(b, 3).unwrap();
        assert_eq!(pairs(&cart), vec![(a, 2), (b, 2)]);

        let cart = cart.with_line_reduced(a, 7).unwrap();
        assert_eq!(pairs(&cart), vec![(b, 2)]);
    }

    #[test]
    fn from_lines_merges_duplicates() {
        let a = ProductId::new();
        let cart = Cart::from_lines([(a, 1), (a, 2)]).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(a), 3);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn zero_quantity_line_cannot_be_deserialized() {
        let json = format!(
            r#"{{"items":[{{"product_id":"{}","quantity":0}}]}}"#,
            ProductId::new()
        );
        assert!(serde_json::from_str::<Cart>(&json).is_err());
    }

    #[test]
    fn missing_items_deserializes_as_empty() {
        let cart: Cart = serde_json::from_str("{}").unwrap();
        assert!(cart.is_empty());
    }
}
