use crate::domain::errors::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait LlmService: Send + Sync {
    /// Generates a completion with `model`, capped at `max_output_tokens`.
    async fn generate(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        max_output_tokens: usize,
    ) -> Result<String, DomainError>;

    /// Combined input and output token limit of `model`.
    fn context_window(&self, model: &str) -> usize;
}
