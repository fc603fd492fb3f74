use std::sync::Arc;

use crate::application::{AnalysisService, ChatService, RagService, SessionIndex};
use crate::infrastructure::{AppConfig, RedisPool};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub session: Arc<SessionIndex>,
    pub rag_service: Arc<RagService>,
    pub chat_service: Arc<ChatService>,
    pub analysis_service: Arc<AnalysisService>,
    pub redis_pool: Option<RedisPool>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        rag_service: Arc<RagService>,
        chat_service: Arc<ChatService>,
        analysis_service: Arc<AnalysisService>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            session: rag_service.session().clone(),
            rag_service,
            chat_service,
            analysis_service,
            redis_pool: None,
        }
    }

    pub fn with_redis_pool(mut self, pool: Option<RedisPool>) -> Self {
        self.redis_pool = pool;
        self
    }
}
