use async_trait::async_trait;

use crate::domain::{errors::DomainError, AnalysisRecord};

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn save(&self, record: &AnalysisRecord) -> Result<(), DomainError>;
    /// Newest first, at most `limit` records.
    async fn list(&self, limit: usize) -> Result<Vec<AnalysisRecord>, DomainError>;
}
