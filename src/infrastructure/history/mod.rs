mod in_memory;
mod redis;

use std::sync::Arc;

pub use in_memory::InMemoryAnalysisStore;
pub use redis::{create_pool, HistoryError, RedisAnalysisStore, RedisPool};

use crate::domain::ports::AnalysisStore;
use crate::infrastructure::config::HistoryConfig;

/// Builds the configured history store, plus the Redis pool when one is used
/// so readiness checks can ping it.
pub fn from_config(
    config: &HistoryConfig,
) -> Result<(Arc<dyn AnalysisStore>, Option<RedisPool>), HistoryError> {
    match config.backend.as_str() {
        "redis" => {
            let pool = create_pool(&config.redis_url)?;
            let store = RedisAnalysisStore::new(pool.clone(), &config.list_key, config.max_entries);
            Ok((Arc::new(store), Some(pool)))
        }
        _ => Ok((Arc::new(InMemoryAnalysisStore::new(config.max_entries)), None)),
    }
}
