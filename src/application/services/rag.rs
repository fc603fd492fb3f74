use std::sync::Arc;
use tracing::instrument;

use crate::application::services::SessionIndex;
use crate::domain::{CollectionId, DomainError, SearchResult};

/// Embeds a query and ranks the session's chunks against it.
pub struct RagService {
    session: Arc<SessionIndex>,
    default_top_k: usize,
}

impl RagService {
    pub fn new(session: Arc<SessionIndex>, default_top_k: usize) -> Self {
        Self {
            session,
            default_top_k,
        }
    }

    pub fn session(&self) -> &Arc<SessionIndex> {
        &self.session
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    #[instrument(skip(self), fields(collection_id = %collection))]
    pub async fn retrieve(
        &self,
        collection: &CollectionId,
        query: &str,
    ) -> Result<Vec<SearchResult>, DomainError> {
        self.retrieve_top_k(collection, query, self.default_top_k).await
    }

    #[instrument(skip(self), fields(collection_id = %collection))]
    pub async fn retrieve_top_k(
        &self,
        collection: &CollectionId,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let embedding = self.session.embed_query(query).await?;
        let results = self.session.search(collection, &embedding, top_k).await?;
        tracing::debug!(hits = results.len(), "retrieved chunks");
        Ok(results)
    }
}
