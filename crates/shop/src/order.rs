//! Immutable order records.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::Product;
use crate::user::User;

/// Denormalized copy of the ordering user.
///
/// Stored by value so the order stays readable after the user record
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_string(),
        }
    }
}

/// A product snapshot merged with the ordered quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

/// An order recorded from a cart. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    id: OrderId,
    items: Vec<OrderItem>,
    user: UserRef,
    created_at: DateTime<Utc>,
}

impl Order {
    pub(crate) fn new(user: UserRef, items: Vec<OrderItem>) -> Self {
        Self {
            id: OrderId::new(),
            items,
            user,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn user(&self) -> &UserRef {
        &self.user
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum of all item quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use common::ProductId;
    use document_store::Document;
    use serde_json::json;

    use super::*;

    fn user_ref() -> UserRef {
        UserRef {
            id: UserId::new(),
            name: "Ada".to_string(),
        }
    }

    #[test]
    fn item_fields_are_flattened_next_to_quantity() {
        let product_id = ProductId::new();
        let order = Order::new(
            user_ref(),
            vec![OrderItem {
                product: Product::new(product_id).with_field("title", json!("Book")),
                quantity: 2,
            }],
        );

        let doc = Document::from_serializable(&order).unwrap();
        let items = doc.get("items").unwrap();
        assert_eq!(
            items,
            &json!([{ "_id": product_id.to_string(), "title": "Book", "quantity": 2 }])
        );
        assert_eq!(doc.get_path("user.name"), Some(&json!("Ada")));
    }

    #[test]
    fn stored_order_reads_back_unchanged() {
        let order = Order::new(user_ref(), vec![]);
        let doc = Document::from_serializable(&order).unwrap();
        let restored: Order = doc.into_typed().unwrap();
        assert_eq!(restored, order);
        assert_eq!(restored.total_quantity(), 0);
    }
}
