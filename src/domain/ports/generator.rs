use crate::domain::{errors::DomainError, Message};
use async_trait::async_trait;

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(
        &self,
        system_context: &str,
        history: &[Message],
        user_query: &str,
    ) -> Result<String, DomainError>;
}
