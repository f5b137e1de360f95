//! Document store abstraction for LIBRIS.
//!
//! Persistence is reached through the [`Collection`] trait so handlers never
//! depend on a concrete backend. The in-process [`MemoryCollection`] is the
//! default backend; it keeps documents keyed by [`DocumentId`] and runs an
//! optional store-side validator before every write.

use async_trait::async_trait;
use thiserror::Error;

pub mod id;
pub mod memory;

pub use id::{DocumentId, ParseIdError};
pub use memory::MemoryCollection;

/// Failure modes surfaced by a collection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused the document (schema-level validation). Attributable
    /// to the submitted data, not the store.
    #[error("{0}")]
    Rejected(String),

    /// The backing store could not be reached or failed internally.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A value that can live in a collection. Documents carry their own
/// identifier once the store has assigned one.
pub trait Document: Clone + Send + Sync + 'static {
    /// Identifier assigned by the store, if any.
    fn id(&self) -> Option<&DocumentId>;

    /// Attach the store-assigned identifier.
    fn assign_id(&mut self, id: DocumentId);
}

/// Repository interface over a single document collection.
#[async_trait]
pub trait Collection<T: Document>: Send + Sync {
    /// Validate and persist a new document. The store assigns the identifier
    /// unless the document already carries one.
    async fn create(&self, doc: T) -> Result<T, StoreError>;

    /// Look up a document by identifier.
    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<T>, StoreError>;

    /// Return every document in the collection, in identifier order.
    async fn find_all(&self) -> Result<Vec<T>, StoreError>;

    /// Validate and upsert an existing document under its own identifier.
    /// A document without an identifier is rejected.
    async fn save(&self, doc: T) -> Result<T, StoreError>;

    /// Remove a document by identifier. Removing an absent document is not
    /// an error.
    async fn delete_by_id(&self, id: &DocumentId) -> Result<(), StoreError>;
}
