pub mod document;
pub mod error;
pub mod filter;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod update;

pub use common::DocumentId;
pub use document::{Document, ID_FIELD};
pub use error::{Result, StoreError};
pub use filter::{Condition, Filter};
pub use memory::{InMemoryDocumentStore, Operation};
pub use postgres::PostgresDocumentStore;
pub use store::{DocumentStore, DocumentStoreExt};
pub use update::{UpdateAck, UpdatePatch};
