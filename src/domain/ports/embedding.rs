use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// Maps text to fixed-dimension vectors. The same text must always produce
/// the same vector for a given model.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    /// Output has the same length and order as `texts`.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;
    fn dimension(&self) -> usize;
    fn model_id(&self) -> &str;
}
