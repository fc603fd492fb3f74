use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingModel;
use rig::providers::{ollama, openai};

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

enum Backend {
    OpenAi(openai::Client),
    Ollama(ollama::Client),
}

/// Remote or local embedding model reached through `rig`.
pub struct RigEmbedding {
    backend: Backend,
    model: String,
    dimension: usize,
}

impl RigEmbedding {
    pub fn openai(model: impl Into<String>, dimension: usize) -> Result<Self, DomainError> {
        require_env("OPENAI_API_KEY")?;
        Ok(Self {
            backend: Backend::OpenAi(openai::Client::from_env()),
            model: model.into(),
            dimension,
        })
    }

    pub fn ollama(model: impl Into<String>, dimension: usize) -> Result<Self, DomainError> {
        require_env("OLLAMA_API_BASE_URL")?;
        Ok(Self {
            backend: Backend::Ollama(ollama::Client::from_env()),
            model: model.into(),
            dimension,
        })
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, DomainError> {
        match config.provider.as_str() {
            "openai" => Self::openai(&config.model, config.dimension),
            "ollama" => Self::ollama(&config.model, config.dimension),
            other => Err(DomainError::validation(format!(
                "unsupported embedding provider: {other}"
            ))),
        }
    }
}

pub(crate) fn require_env(var: &str) -> Result<(), DomainError> {
    std::env::var(var)
        .map(|_| ())
        .map_err(|_| DomainError::validation(format!("{var} is not set")))
}

async fn embed_all<M: EmbeddingModel>(
    model: &M,
    texts: &[&str],
) -> Result<Vec<Embedding>, DomainError> {
    let mut out = Vec::with_capacity(texts.len());
    for batch in texts.chunks(M::MAX_DOCUMENTS.max(1)) {
        let embeddings = model
            .embed_texts(batch.iter().map(|t| t.to_string()).collect::<Vec<_>>())
            .await
            .map_err(|e| DomainError::embedding(e.to_string()))?;
        out.extend(embeddings.into_iter().map(|e| Embedding::from(e.vec)));
    }

    if out.len() != texts.len() {
        return Err(DomainError::embedding(format!(
            "expected {} embeddings, got {}",
            texts.len(),
            out.len()
        )));
    }
    Ok(out)
}

#[async_trait]
impl EmbeddingService for RigEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::embedding("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match &self.backend {
            Backend::OpenAi(client) => {
                let model = client.embedding_model_with_ndims(&self.model, self.dimension);
                embed_all(&model, texts).await
            }
            Backend::Ollama(client) => {
                let model = client.embedding_model_with_ndims(&self.model, self.dimension);
                embed_all(&model, texts).await
            }
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
