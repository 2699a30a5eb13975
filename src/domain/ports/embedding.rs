use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embeds one text. Input longer than [`max_input_tokens`] is rejected
    /// by the provider, so callers truncate first.
    ///
    /// [`max_input_tokens`]: EmbeddingService::max_input_tokens
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    fn model(&self) -> &str;
    fn dimension(&self) -> usize;
    fn max_input_tokens(&self) -> usize;
}
