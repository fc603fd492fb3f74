use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::RwLock;

use crate::domain::{ports::AnalysisStore, AnalysisRecord, DomainError};

pub struct InMemoryAnalysisStore {
    records: RwLock<VecDeque<AnalysisRecord>>,
    max_entries: usize,
}

impl InMemoryAnalysisStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::new()),
            max_entries: max_entries.max(1),
        }
    }
}

impl Default for InMemoryAnalysisStore {
    fn default() -> Self {
        Self::new(500)
    }
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn save(&self, record: &AnalysisRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        records.push_front(record.clone());
        records.truncate(self.max_entries);
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<AnalysisRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.iter().take(limit).cloned().collect())
    }
}
