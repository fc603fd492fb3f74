use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::application::services::RagService;
use crate::domain::{
    assemble_context_with_count, ports::AnswerGenerator, CollectionId, DomainError, Message, Query,
};
use crate::infrastructure::config::{fill_template, AppConfig, ChatPrompts};

/// Runs the generator under a deadline, mapping an elapsed deadline to
/// `GenerationTimeout`.
pub(crate) async fn generate_with_timeout(
    generator: &dyn AnswerGenerator,
    timeout: Duration,
    system_context: &str,
    history: &[Message],
    user_query: &str,
) -> Result<String, DomainError> {
    tokio::time::timeout(timeout, generator.generate(system_context, history, user_query))
        .await
        .map_err(|_| DomainError::timeout(format!("no answer within {}s", timeout.as_secs())))?
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub chunk_id: Uuid,
    pub ordinal: usize,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub collection_id: CollectionId,
    pub sources: Vec<SourceRef>,
}

/// Answers questions about the indexed résumé: retrieve, assemble, generate.
pub struct ChatService {
    rag: Arc<RagService>,
    generator: Arc<dyn AnswerGenerator>,
    prompts: ChatPrompts,
    top_k: usize,
    max_context_chars: usize,
    timeout: Duration,
}

impl ChatService {
    pub fn new(
        rag: Arc<RagService>,
        generator: Arc<dyn AnswerGenerator>,
        config: &AppConfig,
    ) -> Self {
        Self {
            rag,
            generator,
            prompts: config.prompts.chat.clone(),
            top_k: config.config.rag.top_k,
            max_context_chars: config.config.rag.max_context_chars,
            timeout: Duration::from_secs(config.config.llm.timeout_seconds),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_context_chars(mut self, max_context_chars: usize) -> Self {
        self.max_context_chars = max_context_chars;
        self
    }

    fn system_prompt(&self, context: &str) -> String {
        let context = if context.is_empty() {
            self.prompts.no_context.as_str()
        } else {
            context
        };
        fill_template(&self.prompts.system, &[("context", context)])
    }

    #[instrument(skip(self, query), fields(history = query.history.len()))]
    pub async fn ask(
        &self,
        query: &Query,
        collection: Option<CollectionId>,
    ) -> Result<ChatAnswer, DomainError> {
        if query.text.trim().is_empty() {
            return Err(DomainError::validation("message must not be empty"));
        }

        let collection = match collection {
            Some(c) => c,
            None => self
                .rag
                .session()
                .active_collection()
                .await
                .ok_or(DomainError::NoActiveSession)?,
        };

        let results = self
            .rag
            .retrieve_top_k(&collection, &query.text, self.top_k)
            .await?;
        let (context, kept) = assemble_context_with_count(&results, self.max_context_chars);
        let system = self.system_prompt(&context);

        let answer = generate_with_timeout(
            self.generator.as_ref(),
            self.timeout,
            &system,
            &query.history,
            &query.text,
        )
        .await?;

        tracing::info!(
            collection_id = %collection,
            retrieved = results.len(),
            sources = kept,
            "answered question"
        );

        Ok(ChatAnswer {
            answer,
            collection_id: collection,
            sources: results[..kept]
                .iter()
                .map(|r| SourceRef {
                    chunk_id: r.chunk.id,
                    ordinal: r.chunk.ordinal,
                    score: r.score,
                })
                .collect(),
        })
    }
}
