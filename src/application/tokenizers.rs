use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{ports::Tokenizer, DomainError};

/// Tokenizers keyed by model identifier, built once at startup and passed
/// to the services that count tokens.
#[derive(Clone, Default)]
pub struct TokenizerRegistry {
    tokenizers: HashMap<String, Arc<dyn Tokenizer>>,
}

impl TokenizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, model: impl Into<String>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizers.insert(model.into(), tokenizer);
        self
    }

    pub fn get(&self, model: &str) -> Result<Arc<dyn Tokenizer>, DomainError> {
        self.tokenizers.get(model).cloned().ok_or_else(|| {
            DomainError::configuration(format!("no tokenizer registered for model `{model}`"))
        })
    }
}
