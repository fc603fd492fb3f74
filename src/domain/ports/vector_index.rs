use crate::domain::{errors::DomainError, Chunk, CollectionId, Embedding, SearchResult};
use async_trait::async_trait;

/// Storage for the chunks of the one document currently under analysis.
///
/// Callers serialise `reset`/`insert` sequences; `search` may run at any time.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Replaces whatever is held with an empty collection named `collection`.
    async fn reset(&self, collection: &CollectionId) -> Result<(), DomainError>;

    /// Inserts embedded chunks. Fails without inserting anything if a chunk is
    /// unembedded, has the wrong dimension, or reuses an id.
    async fn insert(&self, collection: &CollectionId, chunks: Vec<Chunk>)
        -> Result<(), DomainError>;

    async fn search(
        &self,
        collection: &CollectionId,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError>;

    async fn active_collection(&self) -> Option<CollectionId>;

    async fn len(&self, collection: &CollectionId) -> Result<usize, DomainError>;
}
