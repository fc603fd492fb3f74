use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::application::services::{chat::generate_with_timeout, IngestOutcome, SessionIndex};
use crate::domain::{
    ports::{AnalysisStore, AnswerGenerator},
    AnalysisRecord, CollectionId, Document, DomainError,
};
use crate::infrastructure::config::{fill_template, AnalysisPrompts, AppConfig};

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub document: Document,
    pub job_description: String,
    pub job_role: Option<String>,
    pub company_name: Option<String>,
}

impl AnalysisRequest {
    pub fn new(document: Document, job_description: impl Into<String>) -> Self {
        Self {
            document,
            job_description: job_description.into(),
            job_role: None,
            company_name: None,
        }
    }

    pub fn with_job_role(mut self, job_role: impl Into<String>) -> Self {
        self.job_role = Some(job_role.into());
        self
    }

    pub fn with_company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = Some(company_name.into());
        self
    }
}

/// Scores a résumé against a job description and makes it the active
/// document for follow-up questions.
pub struct AnalysisService {
    session: Arc<SessionIndex>,
    generator: Arc<dyn AnswerGenerator>,
    store: Arc<dyn AnalysisStore>,
    prompts: AnalysisPrompts,
    max_resume_chars: usize,
    timeout: Duration,
}

impl AnalysisService {
    pub fn new(
        session: Arc<SessionIndex>,
        generator: Arc<dyn AnswerGenerator>,
        store: Arc<dyn AnalysisStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            session,
            generator,
            store,
            prompts: config.prompts.analysis.clone(),
            max_resume_chars: config.config.rag.max_resume_chars,
            timeout: Duration::from_secs(config.config.llm.timeout_seconds),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_prompt(&self, resume: &str, job_description: &str) -> String {
        let resume: String = resume.chars().take(self.max_resume_chars).collect();
        fill_template(
            &self.prompts.template,
            &[("resume", resume.as_str()), ("job_description", job_description)],
        )
    }

    #[instrument(skip(self, request), fields(filename = %request.document.name))]
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisRecord, DomainError> {
        if request.job_description.trim().is_empty() {
            return Err(DomainError::validation("job description must not be empty"));
        }

        let collection = CollectionId::generate();
        let outcome = self
            .session
            .ingest(&collection, &request.document.text)
            .await?;
        if let IngestOutcome::Empty { .. } = outcome {
            return Err(DomainError::EmptyInput);
        }

        let prompt = self.build_prompt(&request.document.text, &request.job_description);
        let report = generate_with_timeout(
            self.generator.as_ref(),
            self.timeout,
            &self.prompts.system,
            &[],
            &prompt,
        )
        .await?;

        let record = AnalysisRecord::new(&request.document.name, collection, report)
            .with_job_role(request.job_role)
            .with_company_name(request.company_name)
            .with_chunk_count(outcome.chunk_count());

        if let Err(e) = self.store.save(&record).await {
            tracing::error!(error = %e, analysis_id = %record.id, "failed to persist analysis");
        }

        tracing::info!(
            analysis_id = %record.id,
            collection_id = %record.collection_id,
            match_score = record.match_score,
            "analysis completed"
        );
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn history(&self, limit: usize) -> Result<Vec<AnalysisRecord>, DomainError> {
        self.store.list(limit).await
    }
}
