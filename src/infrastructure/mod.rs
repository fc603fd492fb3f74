pub mod config;
pub mod embedding;
pub mod extract;
pub mod history;
pub mod llm;
pub mod vector_store;

pub use config::{AppConfig, Config, ConfigError, PromptsConfig};
pub use embedding::{HashedEmbedding, RigEmbedding};
pub use extract::document_from_upload;
pub use history::{InMemoryAnalysisStore, RedisAnalysisStore, RedisPool};
pub use llm::RigGenerator;
pub use vector_store::{InMemoryVectorIndex, QdrantVectorIndex};
