use std::path::Path;

use tokenizers::Tokenizer as HfModelTokenizer;

use crate::domain::{ports::Tokenizer, DomainError};

/// Tokenizer loaded from a HuggingFace `tokenizer.json`.
///
/// Special tokens are neither added on encode nor emitted on decode, so
/// counts reflect the text alone.
pub struct HfTokenizer {
    inner: HfModelTokenizer,
}

impl HfTokenizer {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let inner = HfModelTokenizer::from_file(path).map_err(|e| {
            DomainError::configuration(format!("failed to load tokenizer {}: {e}", path.display()))
        })?;
        Ok(Self { inner })
    }

    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self, DomainError> {
        let inner = HfModelTokenizer::from_bytes(bytes)
            .map_err(|e| DomainError::configuration(format!("failed to load tokenizer: {e}")))?;
        Ok(Self { inner })
    }
}

impl Tokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, DomainError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| DomainError::internal(format!("tokenizer encode failed: {e}")))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, DomainError> {
        self.inner
            .decode(ids, true)
            .map_err(|e| DomainError::internal(format!("tokenizer decode failed: {e}")))
    }
}
