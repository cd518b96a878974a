//! Joining cart lines against live product data.

use std::collections::HashMap;

use common::ProductId;
use document_store::{DocumentStore, Filter, StoreError};

use crate::cart::Cart;
use crate::collections::PRODUCTS;
use crate::error::{Result, ShopError};
use crate::order::OrderItem;
use crate::product::Product;

/// Outcome of resolving a single cart line.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedLine {
    /// The product still exists in the catalog.
    Resolved { product: Product, quantity: u32 },

    /// The product has vanished from the catalog since it was added.
    Orphaned { product_id: ProductId, quantity: u32 },
}

impl ResolvedLine {
    pub fn product_id(&self) -> ProductId {
        match self {
            ResolvedLine::Resolved { product, .. } => product.id(),
            ResolvedLine::Orphaned { product_id, .. } => *product_id,
        }
    }

    pub fn quantity(&self) -> u32 {
        match self {
            ResolvedLine::Resolved { quantity, .. } | ResolvedLine::Orphaned { quantity, .. } => {
                *quantity
            }
        }
    }
}

/// A cart materialized against the catalog, in cart line order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedCart {
    lines: Vec<ResolvedLine>,
}

impl ResolvedCart {
    pub fn lines(&self) -> &[ResolvedLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines whose product was found.
    pub fn resolved(&self) -> impl Iterator<Item = (&Product, u32)> {
        self.lines.iter().filter_map(|line| match line {
            ResolvedLine::Resolved { product, quantity } => Some((product, *quantity)),
            ResolvedLine::Orphaned { .. } => None,
        })
    }

    /// Product identifiers that no longer exist in the catalog.
    pub fn orphaned(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.lines.iter().filter_map(|line| match line {
            ResolvedLine::Orphaned {
                product_id,
                quantity,
            } => Some((*product_id, *quantity)),
            ResolvedLine::Resolved { .. } => None,
        })
    }

    pub fn orphan_count(&self) -> usize {
        self.orphaned().count()
    }

    /// Converts the resolved lines into order items. Orphans are dropped.
    pub fn into_order_items(self) -> Vec<OrderItem> {
        self.lines
            .into_iter()
            .filter_map(|line| match line {
                ResolvedLine::Resolved { product, quantity } => {
                    Some(OrderItem { product, quantity })
                }
                ResolvedLine::Orphaned { .. } => None,
            })
            .collect()
    }
}

/// Resolves a cart with a single bulk product lookup.
///
/// A product missing from the catalog yields an `Orphaned` line rather than
/// failing the whole resolution. A failed lookup is a resolution error.
pub async fn resolve_cart<S>(store: &S, cart: &Cart) -> Result<ResolvedCart>
where
    S: DocumentStore + ?Sized,
{
    let documents = store
        .find(PRODUCTS, &Filter::id_in(cart.product_ids()))
        .await
        .map_err(resolution_failed)?;

    let mut catalog: HashMap<ProductId, Product> = HashMap::with_capacity(documents.len());
    for document in documents {
        let product: Product = document.into_typed().map_err(resolution_failed)?;
        catalog.insert(product.id(), product);
    }

    let lines: Vec<ResolvedLine> = cart
        .lines()
        .iter()
        .map(|line| match catalog.remove(&line.product_id()) {
            Some(product) => ResolvedLine::Resolved {
                product,
                quantity: line.quantity(),
            },
            None => ResolvedLine::Orphaned {
                product_id: line.product_id(),
                quantity: line.quantity(),
            },
        })
        .collect();

    let resolved = ResolvedCart { lines };
    let orphans = resolved.orphan_count();
    if orphans > 0 {
        metrics::counter!("cart_orphaned_lines_total").increment(orphans as u64);
        tracing::warn!(orphans, "cart references products missing from the catalog");
    }

    Ok(resolved)
}

fn resolution_failed(error: StoreError) -> ShopError {
    tracing::error!(%error, "cart resolution failed");
    ShopError::Resolution(error)
}
