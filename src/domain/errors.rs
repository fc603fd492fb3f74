use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Document contains no indexable text")]
    EmptyInput,

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Duplicate chunk id: {0}")]
    DuplicateChunkId(Uuid),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("No document has been indexed yet")]
    NoActiveSession,

    #[error("Generation timed out: {0}")]
    GenerationTimeout(String),

    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("Malformed generator output: {0}")]
    MalformedGeneratorOutput(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::GenerationTimeout(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::GenerationUnavailable(msg.into())
    }

    /// Short machine-readable name, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Internal(_) => "internal",
            Self::ExternalService(_) => "external_service",
            Self::EmptyInput => "empty_input",
            Self::EmbeddingUnavailable(_) => "embedding_unavailable",
            Self::DuplicateChunkId(_) => "duplicate_chunk_id",
            Self::UnknownCollection(_) => "unknown_collection",
            Self::NoActiveSession => "no_active_session",
            Self::GenerationTimeout(_) => "generation_timeout",
            Self::GenerationUnavailable(_) => "generation_unavailable",
            Self::MalformedGeneratorOutput(_) => "malformed_generator_output",
        }
    }
}
