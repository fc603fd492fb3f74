use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeleteCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    ports::VectorIndex, Chunk, CollectionId, DomainError, Embedding, SearchResult,
};

struct ActiveCollection {
    id: CollectionId,
    ids: HashSet<Uuid>,
}

/// Session index backed by a Qdrant server. Each reset drops the previous
/// Qdrant collection and creates a fresh one named `{prefix}_{collection_id}`.
pub struct QdrantVectorIndex {
    client: Qdrant,
    prefix: String,
    dimension: usize,
    active: RwLock<Option<ActiveCollection>>,
}

impl QdrantVectorIndex {
    pub fn new(url: &str, prefix: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(Self {
            client,
            prefix: prefix.to_string(),
            dimension,
            active: RwLock::new(None),
        })
    }

    fn collection_name(&self, collection: &CollectionId) -> String {
        format!("{}_{}", self.prefix, collection)
    }

    async fn exists(&self, name: &str) -> Result<bool, DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(collections.collections.iter().any(|c| c.name == name))
    }

    async fn drop_collection(&self, name: &str) -> Result<(), DomainError> {
        if self.exists(name).await? {
            self.client
                .delete_collection(DeleteCollectionBuilder::new(name))
                .await
                .map_err(|e| DomainError::external(e.to_string()))?;
        }
        Ok(())
    }

    fn ensure_active(
        active: &Option<ActiveCollection>,
        collection: &CollectionId,
    ) -> Result<(), DomainError> {
        match active {
            Some(a) if &a.id == collection => Ok(()),
            _ => Err(DomainError::UnknownCollection(collection.to_string())),
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn reset(&self, collection: &CollectionId) -> Result<(), DomainError> {
        let mut active = self.active.write().await;

        if let Some(previous) = active.take() {
            self.drop_collection(&self.collection_name(&previous.id)).await?;
        }

        let name = self.collection_name(collection);
        self.drop_collection(&name).await?;
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&name).vectors_config(VectorParamsBuilder::new(
                    self.dimension as u64,
                    Distance::Cosine,
                )),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        *active = Some(ActiveCollection {
            id: collection.clone(),
            ids: HashSet::new(),
        });
        tracing::debug!(collection = %name, "qdrant collection recreated");
        Ok(())
    }

    async fn insert(
        &self,
        collection: &CollectionId,
        chunks: Vec<Chunk>,
    ) -> Result<(), DomainError> {
        let mut active = self.active.write().await;
        Self::ensure_active(&active, collection)?;

        let mut batch_ids = HashSet::new();
        let mut points = Vec::with_capacity(chunks.len());
        {
            let known = active.as_ref().map(|a| &a.ids);
            for chunk in &chunks {
                let embedding = chunk.embedding.as_ref().ok_or_else(|| {
                    DomainError::internal(format!("chunk {} has no embedding", chunk.id))
                })?;
                if embedding.dimension() != self.dimension {
                    return Err(DomainError::validation(format!(
                        "embedding dimension {} does not match collection dimension {}",
                        embedding.dimension(),
                        self.dimension
                    )));
                }
                let seen = known.is_some_and(|ids| ids.contains(&chunk.id));
                if seen || !batch_ids.insert(chunk.id) {
                    return Err(DomainError::DuplicateChunkId(chunk.id));
                }

                let payload: Payload = serde_json::json!({
                    "chunk_id": chunk.id.to_string(),
                    "ordinal": chunk.ordinal,
                    "text": chunk.text,
                })
                .try_into()
                .map_err(|_| DomainError::internal("Failed to create payload"))?;

                points.push(PointStruct::new(
                    chunk.id.to_string(),
                    embedding.as_slice().to_vec(),
                    payload,
                ));
            }
        }

        if points.is_empty() {
            return Ok(());
        }

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(self.collection_name(collection), points).wait(true),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        if let Some(a) = active.as_mut() {
            a.ids.extend(batch_ids);
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &CollectionId,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        // Held for the whole query so a concurrent reset cannot drop the
        // collection underneath it.
        let active = self.active.read().await;
        Self::ensure_active(&active, collection)?;
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(
                    self.collection_name(collection),
                    query.as_slice().to_vec(),
                    top_k as u64,
                )
                .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let search_results: Vec<SearchResult> = results
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload;

                let id: Uuid = payload.get("chunk_id")?.as_str()?.parse().ok()?;
                let ordinal = payload.get("ordinal")?.as_integer()? as usize;
                let text = payload.get("text")?.as_str()?.to_string();

                Some(SearchResult {
                    chunk: Chunk {
                        id,
                        ordinal,
                        text,
                        embedding: None,
                    },
                    score: point.score,
                })
            })
            .collect();

        drop(active);
        Ok(search_results)
    }

    async fn active_collection(&self) -> Option<CollectionId> {
        self.active.read().await.as_ref().map(|a| a.id.clone())
    }

    async fn len(&self, collection: &CollectionId) -> Result<usize, DomainError> {
        let active = self.active.read().await;
        Self::ensure_active(&active, collection)?;
        Ok(active.as_ref().map_or(0, |a| a.ids.len()))
    }
}
