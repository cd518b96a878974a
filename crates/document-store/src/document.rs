use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{DocumentId, Result, StoreError};

/// Name of the identifier field every stored document carries.
pub const ID_FIELD: &str = "_id";

/// A schemaless JSON object stored in a collection.
///
/// Documents are plain JSON maps. Typed entities are converted at the edge
/// with [`Document::from_serializable`] and [`Document::deserialize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(StoreError::InvalidDocument(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// Serializes a typed value into a document.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self> {
        Self::from_value(serde_json::to_value(value)?)
    }

    /// Deserializes the document into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    /// Consumes the document and deserializes it into a typed value.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0))?)
    }

    /// Returns the document's `_id`, if present and well-formed.
    pub fn id(&self) -> Option<DocumentId> {
        self.0
            .get(ID_FIELD)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Returns the `_id` or an error describing why it is unusable.
    pub fn require_id(&self) -> Result<DocumentId> {
        match self.0.get(ID_FIELD) {
            None => Err(StoreError::InvalidDocument("missing _id".to_string())),
            Some(value) => serde_json::from_value(value.clone()).map_err(|_| {
                StoreError::InvalidDocument(format!("_id is not a valid identifier: {value}"))
            }),
        }
    }

    /// Sets the document's `_id`.
    pub fn set_id(&mut self, id: DocumentId) {
        self.0
            .insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    }

    /// Returns a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Resolves a dotted path such as `user._id` through nested objects.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Sets a top-level field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Returns the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts the document into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
