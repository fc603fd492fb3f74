mod in_memory;
mod qdrant;

use std::sync::Arc;

pub use in_memory::InMemoryVectorIndex;
pub use qdrant::QdrantVectorIndex;

use crate::domain::{ports::VectorIndex, DomainError};
use crate::infrastructure::config::VectorStoreConfig;

pub fn from_config(
    config: &VectorStoreConfig,
    dimension: usize,
) -> Result<Arc<dyn VectorIndex>, DomainError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryVectorIndex::new())),
        "qdrant" => Ok(Arc::new(QdrantVectorIndex::new(
            &config.url,
            &config.collection_prefix,
            dimension,
        )?)),
        other => Err(DomainError::validation(format!(
            "unsupported vector store backend: {other}"
        ))),
    }
}
