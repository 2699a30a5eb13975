mod huggingface;

pub use huggingface::HfTokenizer;

use std::sync::Arc;

use tracing::info;

use crate::application::TokenizerRegistry;
use crate::domain::DomainError;
use crate::infrastructure::config::TokenizersConfig;

/// Loads every configured tokenizer and checks the given models are covered.
pub fn load_registry(
    config: &TokenizersConfig,
    required_models: &[&str],
) -> Result<TokenizerRegistry, DomainError> {
    let mut registry = TokenizerRegistry::new();
    for (model, path) in &config.0 {
        let tokenizer = HfTokenizer::from_file(path)?;
        info!(model = %model, path = %path.display(), "tokenizer loaded");
        registry = registry.register(model.clone(), Arc::new(tokenizer));
    }

    for model in required_models {
        registry.get(model)?;
    }
    Ok(registry)
}
