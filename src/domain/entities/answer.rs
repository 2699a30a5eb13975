use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chunk that made it into the prompt, as cited back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceChunk {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub chunk_index: usize,
    /// Text as it was placed in the prompt, after any truncation.
    pub content: String,
    pub score: f32,
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextReport {
    pub budget: usize,
    pub used_tokens: usize,
    pub truncated: bool,
    pub dropped: usize,
}

impl ContextReport {
    pub fn is_degraded(&self) -> bool {
        self.truncated || self.dropped > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub query: String,
    pub text: String,
    pub sources: Vec<SourceChunk>,
    pub context: ContextReport,
}

impl Answer {
    pub fn no_results(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            text: message.into(),
            sources: Vec::new(),
            context: ContextReport::default(),
        }
    }
}
