//! Read-only view of catalog products.

use common::ProductId;
use document_store::Document;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A catalog product: an identifier plus whatever descriptive fields the
/// catalog stores. The core never interprets those fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    id: ProductId,

    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Product {
    /// Creates a product with no descriptive fields.
    pub fn new(id: ProductId) -> Self {
        Self {
            id,
            fields: Map::new(),
        }
    }

    /// Adds a descriptive field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    /// Returns a descriptive field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All descriptive fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Converts the product into a storable document.
    pub fn to_document(&self) -> document_store::Result<Document> {
        Document::from_serializable(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn document_shape_is_flat() {
        let id = ProductId::new();
        let product = Product::new(id)
            .with_field("title", json!("Book"))
            .with_field("price", json!(12.99));

        let doc = product.to_document().unwrap();
        assert_eq!(doc.id(), Some(id.into()));
        assert_eq!(doc.get("title"), Some(&json!("Book")));
        assert_eq!(doc.get("price"), Some(&json!(12.99)));
    }

    #[test]
    fn unknown_fields_survive_a_roundtrip() {
        let id = ProductId::new();
        let doc = Document::from_value(json!({
            "_id": id.to_string(),
            "title": "Lamp",
            "dimensions": { "h": 40, "w": 20 }
        }))
        .unwrap();

        let product: Product = doc.deserialize().unwrap();
        assert_eq!(product.id(), id);
        assert_eq!(product.field("dimensions"), Some(&json!({ "h": 40, "w": 20 })));
        assert_eq!(product.to_document().unwrap(), doc);
    }
}
