use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, VectorIndex},
    Chunk, Chunker, CollectionId, DomainError, Embedding, SearchResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Indexed {
        collection_id: CollectionId,
        chunks: usize,
    },
    /// The document had no non-whitespace text; the collection was reset and
    /// left empty.
    Empty { collection_id: CollectionId },
}

impl IngestOutcome {
    pub fn collection_id(&self) -> &CollectionId {
        match self {
            Self::Indexed { collection_id, .. } | Self::Empty { collection_id } => collection_id,
        }
    }

    pub fn chunk_count(&self) -> usize {
        match self {
            Self::Indexed { chunks, .. } => *chunks,
            Self::Empty { .. } => 0,
        }
    }
}

/// The per-process session index: one active document, rebuilt on every
/// ingest.
///
/// Writers (`reset`, `put`, `ingest`) are serialised by an async mutex so two
/// uploads never interleave their inserts. Searches do not take the mutex.
pub struct SessionIndex {
    embedding: Arc<dyn EmbeddingService>,
    index: Arc<dyn VectorIndex>,
    chunker: Chunker,
    embed_timeout: Duration,
    write_lock: Mutex<()>,
}

impl SessionIndex {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        index: Arc<dyn VectorIndex>,
        chunker: Chunker,
    ) -> Self {
        Self {
            embedding,
            index,
            chunker,
            embed_timeout: Duration::from_secs(30),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    pub fn embedding_model_id(&self) -> &str {
        self.embedding.model_id()
    }

    pub async fn active_collection(&self) -> Option<CollectionId> {
        self.index.active_collection().await
    }

    pub async fn len(&self, collection: &CollectionId) -> Result<usize, DomainError> {
        self.index.len(collection).await
    }

    #[instrument(skip(self), fields(collection_id = %collection))]
    pub async fn reset(&self, collection: &CollectionId) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;
        self.index.reset(collection).await
    }

    #[instrument(skip(self, chunks), fields(collection_id = %collection, count = chunks.len()))]
    pub async fn put(
        &self,
        collection: &CollectionId,
        chunks: Vec<Chunk>,
    ) -> Result<usize, DomainError> {
        let _guard = self.write_lock.lock().await;
        self.put_locked(collection, chunks).await
    }

    /// Resets `collection` and indexes `text` into it as one critical section.
    #[instrument(skip(self, text), fields(collection_id = %collection, chars = text.len()))]
    pub async fn ingest(
        &self,
        collection: &CollectionId,
        text: &str,
    ) -> Result<IngestOutcome, DomainError> {
        let _guard = self.write_lock.lock().await;
        self.index.reset(collection).await?;

        if text.trim().is_empty() {
            tracing::info!("document is blank, nothing to index");
            return Ok(IngestOutcome::Empty {
                collection_id: collection.clone(),
            });
        }

        let chunks = self.chunker.chunk(text);
        let count = self.put_locked(collection, chunks).await?;
        tracing::info!(chunks = count, model = self.embedding.model_id(), "document indexed");

        Ok(IngestOutcome::Indexed {
            collection_id: collection.clone(),
            chunks: count,
        })
    }

    pub async fn search(
        &self,
        collection: &CollectionId,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        self.index.search(collection, query, top_k).await
    }

    pub async fn embed_query(&self, text: &str) -> Result<Embedding, DomainError> {
        tokio::time::timeout(self.embed_timeout, self.embedding.embed(text))
            .await
            .map_err(|_| DomainError::embedding("query embedding timed out"))?
    }

    async fn put_locked(
        &self,
        collection: &CollectionId,
        mut chunks: Vec<Chunk>,
    ) -> Result<usize, DomainError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        // Embed everything first so a failure inserts nothing.
        let pending: Vec<usize> = chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_embedded())
            .map(|(i, _)| i)
            .collect();

        if !pending.is_empty() {
            let texts: Vec<&str> = pending.iter().map(|&i| chunks[i].text.as_str()).collect();
            let embeddings = tokio::time::timeout(
                self.embed_timeout,
                self.embedding.embed_batch(&texts),
            )
            .await
            .map_err(|_| DomainError::embedding("chunk embedding timed out"))??;

            if embeddings.len() != pending.len() {
                return Err(DomainError::embedding(format!(
                    "expected {} embeddings, got {}",
                    pending.len(),
                    embeddings.len()
                )));
            }
            for (i, embedding) in pending.into_iter().zip(embeddings) {
                chunks[i].embedding = Some(embedding);
            }
        }

        let count = chunks.len();
        self.index.insert(collection, chunks).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{HashedEmbedding, InMemoryVectorIndex};
    use async_trait::async_trait;

    struct BrokenEmbedding;

    #[async_trait]
    impl EmbeddingService for BrokenEmbedding {
        async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
            Err(DomainError::embedding("model not loaded"))
        }

        async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            Err(DomainError::embedding("model not loaded"))
        }

        fn dimension(&self) -> usize {
            8
        }

        fn model_id(&self) -> &str {
            "broken"
        }
    }

    fn session(embedding: Arc<dyn EmbeddingService>, size: usize) -> SessionIndex {
        SessionIndex::new(
            embedding,
            Arc::new(InMemoryVectorIndex::new()),
            Chunker::contiguous(size).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_ingest_indexes_chunks() {
        let session = session(Arc::new(HashedEmbedding::new(64)), 7);
        let c = CollectionId::new("c");

        let outcome = session.ingest(&c, "ALPHA BETA GAMMA DELTA").await.unwrap();

        assert_eq!(outcome.chunk_count(), 4);
        assert_eq!(session.len(&c).await.unwrap(), 4);
        assert_eq!(session.active_collection().await, Some(c));
    }

    #[tokio::test]
    async fn test_ingest_blank_document() {
        let session = session(Arc::new(HashedEmbedding::new(64)), 7);
        let c = CollectionId::new("c");

        let outcome = session.ingest(&c, "   \n ").await.unwrap();

        assert_eq!(
            outcome,
            IngestOutcome::Empty {
                collection_id: c.clone()
            }
        );
        assert_eq!(session.len(&c).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_inserts_nothing() {
        let session = session(Arc::new(BrokenEmbedding), 7);
        let c = CollectionId::new("c");

        let err = session.ingest(&c, "some resume text").await.unwrap_err();

        assert!(matches!(err, DomainError::EmbeddingUnavailable(_)));
        assert_eq!(session.len(&c).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_put_keeps_existing_embeddings() {
        let session = session(Arc::new(HashedEmbedding::new(4)), 10);
        let c = CollectionId::new("c");
        session.reset(&c).await.unwrap();

        let preset =
            Chunk::new(0, "anything").with_embedding(Embedding::new(vec![0.0, 0.0, 0.0, 1.0]));
        let count = session
            .put(&c, vec![preset, Chunk::new(1, "rust")])
            .await
            .unwrap();
        assert_eq!(count, 2);

        let results = session
            .search(&c, &Embedding::new(vec![0.0, 0.0, 0.0, 1.0]), 1)
            .await
            .unwrap();
        assert_eq!(results[0].chunk.text, "anything");
    }
}
