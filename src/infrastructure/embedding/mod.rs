mod hashed;
mod remote;

use std::sync::Arc;

pub use hashed::HashedEmbedding;
pub(crate) use remote::require_env;
pub use remote::RigEmbedding;

use crate::domain::{ports::EmbeddingService, DomainError};
use crate::infrastructure::config::EmbeddingConfig;

pub fn from_config(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingService>, DomainError> {
    match config.provider.as_str() {
        "hashed" => Ok(Arc::new(
            HashedEmbedding::new(config.dimension).with_model(&config.model),
        )),
        _ => Ok(Arc::new(RigEmbedding::from_config(config)?)),
    }
}
