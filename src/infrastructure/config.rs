use regex::{Captures, Regex};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::domain::Chunker;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings file plus prompt templates, each loaded from its own YAML file.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Reads `config.yaml` and `prompts.yaml` from `dir`. A missing file
    /// leaves the corresponding defaults in place; environment overrides are
    /// applied last.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let config: Config = read_yaml(&dir.join("config.yaml"))?.unwrap_or_default();
        let prompts: PromptsConfig = read_yaml(&dir.join("prompts.yaml"))?.unwrap_or_default();

        let mut app = Self { config, prompts };
        app.config.apply_env();
        app.config.validate()?;
        Ok(app)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let dir = std::env::var("APP_CONFIG_DIR").unwrap_or_else(|_| "config".into());
        Self::load(dir)
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&raw)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub rag: RagConfig,
    pub vector_store: VectorStoreConfig,
    pub history: HistoryConfig,
    pub cors: CorsConfig,
}

impl Config {
    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(url) = std::env::var("REDIS_URL") {
            self.history.redis_url = url;
        }
        if let Ok(url) = std::env::var("QDRANT_URL") {
            self.vector_store.url = url;
        }
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Ok(provider) = std::env::var("EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rag.chunker()?;
        if self.rag.top_k == 0 {
            return Err(ConfigError::Invalid("rag.top_k must be greater than zero".into()));
        }
        if self.rag.max_context_chars == 0 {
            return Err(ConfigError::Invalid(
                "rag.max_context_chars must be greater than zero".into(),
            ));
        }
        if self.embedding.dimension == 0 {
            return Err(ConfigError::Invalid(
                "embedding.dimension must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3".to_string(),
            timeout_seconds: 120,
            max_tokens: 2048,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub dimension: usize,
    pub timeout_seconds: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hashed".to_string(),
            model: "hashed-trigram-v1".to_string(),
            dimension: 384,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub max_context_chars: usize,
    pub max_resume_chars: usize,
}

impl RagConfig {
    pub fn chunker(&self) -> Result<Chunker, ConfigError> {
        Chunker::new(self.chunk_size, self.chunk_overlap)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 0,
            top_k: 3,
            max_context_chars: 3000,
            max_resume_chars: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    /// `memory` or `qdrant`.
    pub backend: String,
    pub url: String,
    pub collection_prefix: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            url: "http://localhost:6334".to_string(),
            collection_prefix: "resume".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// `memory` or `redis`.
    pub backend: String,
    pub redis_url: String,
    pub list_key: String,
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            list_key: "analyses:history".to_string(),
            max_entries: 500,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is a valid regex")
    })
}

/// Substitutes `{name}` placeholders in a single pass over `template`.
///
/// Substituted values are not scanned again, so user text containing
/// `{resume}` stays literal. Unknown placeholders are left untouched.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub analysis: AnalysisPrompts,
    pub chat: ChatPrompts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisPrompts {
    pub system: String,
    /// Placeholders: `{resume}`, `{job_description}`.
    pub template: String,
}

impl Default for AnalysisPrompts {
    fn default() -> Self {
        Self {
            system: "You are an expert technical recruiter.".to_string(),
            template: "Analyze this resume against the job description.\n\n\
                RESUME:\n{resume}\n\n\
                JOB DESCRIPTION:\n{job_description}\n\n\
                Provide a professional response.\n\
                Strictly format your answer as clean text (not JSON) with these sections:\n\n\
                1. MATCH SCORE: (Give a score out of 100)\n\
                2. MISSING SKILLS: (List key missing skills)\n\
                3. INTERVIEW QUESTIONS: (List 3 specific questions)\n\
                4. ADVICE: (One paragraph of advice)"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    /// Placeholder: `{context}`.
    pub system: String,
    pub no_context: String,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        Self {
            system: "You answer questions about a candidate's resume. Use only the resume \
                excerpts below. If the answer is not in them, say so.\n\n\
                RESUME EXCERPTS:\n{context}"
                .to_string(),
            no_context: "(no relevant resume content was found)".to_string(),
        }
    }
}
