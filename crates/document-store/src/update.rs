use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Document, ID_FIELD, Result, StoreError};

/// A full-field `$set` patch.
///
/// Each entry replaces a top-level field wholesale. There are no
/// incremental or per-element operators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePatch {
    set: Map<String, Value>,
}

impl UpdatePatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a patch setting a single field from a serializable value.
    pub fn set(field: impl Into<String>, value: &impl Serialize) -> Result<Self> {
        Self::new().and_set(field, value)
    }

    /// Adds a field assignment from a serializable value.
    pub fn and_set(self, field: impl Into<String>, value: &impl Serialize) -> Result<Self> {
        Ok(self.and_set_raw(field, serde_json::to_value(value)?))
    }

    /// Adds a field assignment from a raw JSON value.
    pub fn and_set_raw(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set.insert(field.into(), value);
        self
    }

    /// Returns the field assignments.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.set
    }

    /// Rejects patches that would rewrite the document identity.
    pub fn validate(&self) -> Result<()> {
        if self.set.contains_key(ID_FIELD) {
            return Err(StoreError::InvalidDocument(
                "an update may not set _id".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies the patch in place, returning true if any field changed.
    pub fn apply_to(&self, document: &mut Document) -> bool {
        let mut modified = false;
        for (field, value) in &self.set {
            if document.get(field) != Some(value) {
                document.insert(field.clone(), value.clone());
                modified = true;
            }
        }
        modified
    }
}

/// Acknowledgement returned by `update_one`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateAck {
    /// Number of documents that matched the filter (0 or 1).
    pub matched: u64,

    /// Number of documents whose contents actually changed (0 or 1).
    pub modified: u64,
}

impl UpdateAck {
    /// Acknowledgement for a filter that matched nothing.
    pub fn unmatched() -> Self {
        Self::default()
    }

    /// Returns true if the filter matched a document.
    pub fn is_matched(&self) -> bool {
        self.matched > 0
    }
}
