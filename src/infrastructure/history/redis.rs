use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Connection, Pool, Runtime};

use crate::domain::{ports::AnalysisStore, AnalysisRecord, DomainError};

pub type RedisPool = Pool;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Redis pool error: {0}")]
    Pool(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<HistoryError> for DomainError {
    fn from(e: HistoryError) -> Self {
        match e {
            HistoryError::Serialization(e) => DomainError::internal(e.to_string()),
            other => DomainError::external(other.to_string()),
        }
    }
}

pub fn create_pool(redis_url: &str) -> Result<RedisPool, HistoryError> {
    let cfg = Config::from_url(redis_url);
    cfg.create_pool(Some(Runtime::Tokio1))
        .map_err(|e| HistoryError::Pool(e.to_string()))
}

/// Inclusive LRANGE stop index for the newest `limit` entries. The list never
/// holds more than `max_entries`, so larger limits are clamped to it.
fn lrange_stop(limit: usize, max_entries: usize) -> isize {
    let count = limit.min(max_entries).max(1);
    isize::try_from(count).map_or(isize::MAX, |c| c - 1)
}

/// Analysis history kept in a capped Redis list, newest at the head.
#[derive(Clone)]
pub struct RedisAnalysisStore {
    pool: RedisPool,
    list_key: String,
    max_entries: usize,
}

impl RedisAnalysisStore {
    pub fn new(pool: RedisPool, list_key: impl Into<String>, max_entries: usize) -> Self {
        Self {
            pool,
            list_key: list_key.into(),
            max_entries: max_entries.max(1),
        }
    }

    async fn conn(&self) -> Result<Connection, HistoryError> {
        self.pool
            .get()
            .await
            .map_err(|e| HistoryError::Pool(e.to_string()))
    }
}

#[async_trait]
impl AnalysisStore for RedisAnalysisStore {
    async fn save(&self, record: &AnalysisRecord) -> Result<(), DomainError> {
        let json = serde_json::to_string(record).map_err(HistoryError::from)?;
        let mut conn = self.conn().await?;

        conn.lpush::<_, _, ()>(&self.list_key, &json)
            .await
            .map_err(|e| HistoryError::Redis(e.to_string()))?;
        conn.ltrim::<_, ()>(&self.list_key, 0, lrange_stop(self.max_entries, self.max_entries))
            .await
            .map_err(|e| HistoryError::Redis(e.to_string()))?;

        tracing::info!(analysis_id = %record.id, key = %self.list_key, "analysis saved");
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<AnalysisRecord>, DomainError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let stop = lrange_stop(limit, self.max_entries);
        let mut conn = self.conn().await?;
        let rows: Vec<String> = conn
            .lrange(&self.list_key, 0, stop)
            .await
            .map_err(|e| HistoryError::Redis(e.to_string()))?;

        Ok(rows
            .iter()
            .filter_map(|row| match serde_json::from_str(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable history entry");
                    None
                }
            })
            .collect())
    }
}
