use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Collection, Document, DocumentId, StoreError};

type Validator<T> = Box<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// In-process document collection keyed by [`DocumentId`].
///
/// An optional validator runs before every write; a rejection surfaces as
/// [`StoreError::Rejected`] so callers can tell refused data apart from an
/// unavailable store.
pub struct MemoryCollection<T> {
    docs: RwLock<BTreeMap<DocumentId, T>>,
    validator: Option<Validator<T>>,
}

impl<T: Document> MemoryCollection<T> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
            validator: None,
        }
    }

    /// Create a collection that runs `validator` before every write.
    pub fn with_validator(
        validator: impl Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
            validator: Some(Box::new(validator)),
        }
    }

    fn validate(&self, doc: &T) -> Result<(), StoreError> {
        if let Some(validator) = &self.validator {
            validator(doc).map_err(StoreError::Rejected)?;
        }
        Ok(())
    }
}

impl<T: Document> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Document> Collection<T> for MemoryCollection<T> {
    async fn create(&self, mut doc: T) -> Result<T, StoreError> {
        self.validate(&doc)?;

        let id = match doc.id() {
            Some(id) => id.clone(),
            None => DocumentId::generate(),
        };
        doc.assign_id(id.clone());

        self.docs.write().await.insert(id.clone(), doc.clone());
        tracing::debug!(%id, "document created");
        Ok(doc)
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<T>, StoreError> {
        Ok(self.docs.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.docs.read().await.values().cloned().collect())
    }

    async fn save(&self, doc: T) -> Result<T, StoreError> {
        self.validate(&doc)?;

        let id = doc
            .id()
            .cloned()
            .ok_or_else(|| StoreError::Rejected("document has no id".to_string()))?;

        self.docs.write().await.insert(id.clone(), doc.clone());
        tracing::debug!(%id, "document saved");
        Ok(doc)
    }

    async fn delete_by_id(&self, id: &DocumentId) -> Result<(), StoreError> {
        self.docs.write().await.remove(id);
        tracing::debug!(%id, "document deleted");
        Ok(())
    }
}
