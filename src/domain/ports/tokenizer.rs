use crate::domain::errors::DomainError;

/// Model-specific tokenizer. Must be deterministic for a given model.
pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<u32>, DomainError>;
    fn decode(&self, ids: &[u32]) -> Result<String, DomainError>;

    fn count_tokens(&self, text: &str) -> Result<usize, DomainError> {
        Ok(self.encode(text)?.len())
    }
}
