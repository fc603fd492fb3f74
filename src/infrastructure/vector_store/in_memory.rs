use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::domain::{
    ports::VectorIndex, Chunk, CollectionId, DomainError, Embedding, SearchResult,
};

/// One document's worth of embedded chunks. Immutable once published; every
/// write builds a new snapshot so readers holding the old `Arc` are never
/// disturbed.
#[derive(Debug, Clone)]
struct Collection {
    id: CollectionId,
    dimension: Option<usize>,
    ids: HashSet<Uuid>,
    entries: Vec<(Chunk, Embedding)>,
}

impl Collection {
    fn empty(id: CollectionId) -> Self {
        Self {
            id,
            dimension: None,
            ids: HashSet::new(),
            entries: Vec::new(),
        }
    }
}

pub struct InMemoryVectorIndex {
    active: RwLock<Option<Arc<Collection>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self {
            active: RwLock::new(None),
        }
    }

    fn snapshot(&self, collection: &CollectionId) -> Result<Arc<Collection>, DomainError> {
        let active = self
            .active
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        match active.as_ref() {
            Some(c) if &c.id == collection => Ok(c.clone()),
            _ => Err(DomainError::UnknownCollection(collection.to_string())),
        }
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn reset(&self, collection: &CollectionId) -> Result<(), DomainError> {
        let mut active = self
            .active
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        *active = Some(Arc::new(Collection::empty(collection.clone())));
        Ok(())
    }

    async fn insert(
        &self,
        collection: &CollectionId,
        chunks: Vec<Chunk>,
    ) -> Result<(), DomainError> {
        let mut active = self
            .active
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let current = match active.as_ref() {
            Some(c) if &c.id == collection => c,
            _ => return Err(DomainError::UnknownCollection(collection.to_string())),
        };

        let mut next = Collection::clone(current);
        for mut chunk in chunks {
            let embedding = chunk.embedding.take().ok_or_else(|| {
                DomainError::internal(format!("chunk {} has no embedding", chunk.id))
            })?;

            let dimension = *next.dimension.get_or_insert(embedding.dimension());
            if embedding.dimension() != dimension {
                return Err(DomainError::validation(format!(
                    "embedding dimension {} does not match collection dimension {}",
                    embedding.dimension(),
                    dimension
                )));
            }

            if !next.ids.insert(chunk.id) {
                return Err(DomainError::DuplicateChunkId(chunk.id));
            }
            next.entries.push((chunk, embedding));
        }

        *active = Some(Arc::new(next));
        Ok(())
    }

    async fn search(
        &self,
        collection: &CollectionId,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let snapshot = self.snapshot(collection)?;

        let mut results: Vec<SearchResult> = snapshot
            .entries
            .iter()
            .map(|(chunk, embedding)| SearchResult {
                chunk: chunk.clone(),
                score: query.cosine_similarity(embedding),
            })
            .collect();

        // Stable sort: ties keep document order.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);
        Ok(results)
    }

    async fn active_collection(&self) -> Option<CollectionId> {
        self.active
            .read()
            .ok()
            .and_then(|active| active.as_ref().map(|c| c.id.clone()))
    }

    async fn len(&self, collection: &CollectionId) -> Result<usize, DomainError> {
        Ok(self.snapshot(collection)?.entries.len())
    }
}
