use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::{anthropic, gemini, ollama, openai};

use crate::domain::{ports::AnswerGenerator, render_history, DomainError, Message};
use crate::infrastructure::config::LlmConfig;
use crate::infrastructure::embedding::require_env;

enum Backend {
    Anthropic(anthropic::Client),
    Gemini(gemini::Client),
    Ollama(ollama::Client),
    OpenAi(openai::Client),
}

/// Text generation through a `rig` completion provider, chosen by name.
pub struct RigGenerator {
    backend: Backend,
    model: String,
    max_tokens: u64,
}

impl RigGenerator {
    pub fn from_config(config: &LlmConfig) -> Result<Self, DomainError> {
        let backend = match config.provider.as_str() {
            "anthropic" => {
                require_env("ANTHROPIC_API_KEY")?;
                Backend::Anthropic(anthropic::Client::from_env())
            }
            "gemini" => {
                require_env("GEMINI_API_KEY")?;
                Backend::Gemini(gemini::Client::from_env())
            }
            "ollama" => {
                require_env("OLLAMA_API_BASE_URL")?;
                Backend::Ollama(ollama::Client::from_env())
            }
            "openai" => {
                require_env("OPENAI_API_KEY")?;
                Backend::OpenAi(openai::Client::from_env())
            }
            other => {
                return Err(DomainError::validation(format!(
                    "unsupported llm provider: {other}"
                )))
            }
        };

        Ok(Self {
            backend,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn build_prompt(history: &[Message], user_query: &str) -> String {
    if history.is_empty() {
        return user_query.to_string();
    }

    format!(
        "Previous conversation:\n{}\n\nCurrent message from user: {}",
        render_history(history),
        user_query
    )
}

#[async_trait]
impl AnswerGenerator for RigGenerator {
    async fn generate(
        &self,
        system_context: &str,
        history: &[Message],
        user_query: &str,
    ) -> Result<String, DomainError> {
        let prompt = build_prompt(history, user_query);
        let prompt = prompt.as_str();

        let reply = match &self.backend {
            Backend::Anthropic(client) => {
                client
                    .agent(&self.model)
                    .preamble(system_context)
                    .max_tokens(self.max_tokens)
                    .build()
                    .prompt(prompt)
                    .await
            }
            Backend::Gemini(client) => {
                client
                    .agent(&self.model)
                    .preamble(system_context)
                    .max_tokens(self.max_tokens)
                    .build()
                    .prompt(prompt)
                    .await
            }
            Backend::Ollama(client) => {
                client
                    .agent(&self.model)
                    .preamble(system_context)
                    .max_tokens(self.max_tokens)
                    .build()
                    .prompt(prompt)
                    .await
            }
            Backend::OpenAi(client) => {
                client
                    .agent(&self.model)
                    .preamble(system_context)
                    .max_tokens(self.max_tokens)
                    .build()
                    .prompt(prompt)
                    .await
            }
        };

        reply.map_err(|e| DomainError::generation(format!("{} failed: {e}", self.model)))
    }
}
