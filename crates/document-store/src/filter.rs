use serde_json::Value;

use crate::{Document, DocumentId};

/// A single predicate over a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `_id` equals the given identifier.
    IdEq(DocumentId),

    /// `_id` is one of the given identifiers.
    IdIn(Vec<DocumentId>),

    /// The value at a dotted path equals the given JSON value.
    FieldEq { path: String, value: Value },
}

impl Condition {
    /// Evaluates the condition against a document.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Condition::IdEq(id) => document.id() == Some(*id),
            Condition::IdIn(ids) => document.id().is_some_and(|id| ids.contains(&id)),
            Condition::FieldEq { path, value } => document.get_path(path) == Some(value),
        }
    }
}

/// Builder for document filters.
///
/// A filter is a conjunction of conditions. An empty filter matches every
/// document in the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Creates a filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter for a single document by `_id`.
    pub fn by_id(id: impl Into<DocumentId>) -> Self {
        Self::new().id(id)
    }

    /// Creates a filter matching any of the given identifiers.
    ///
    /// An empty identifier set matches nothing.
    pub fn id_in<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DocumentId>,
    {
        Self {
            conditions: vec![Condition::IdIn(ids.into_iter().map(Into::into).collect())],
        }
    }

    /// Creates a filter on a single field.
    pub fn field(path: impl Into<String>, value: Value) -> Self {
        Self::new().field_eq(path, value)
    }

    /// Adds an `_id` equality condition.
    pub fn id(mut self, id: impl Into<DocumentId>) -> Self {
        self.conditions.push(Condition::IdEq(id.into()));
        self
    }

    /// Adds a field equality condition on a dotted path.
    pub fn field_eq(mut self, path: impl Into<String>, value: Value) -> Self {
        self.conditions.push(Condition::FieldEq {
            path: path.into(),
            value,
        });
        self
    }

    /// Returns the conditions in this filter.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns true if every condition matches the document.
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(document))
    }
}
