use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingCategory {
    Llm,
    Retrieval,
    Chunking,
    General,
}

/// Administrator-editable key/value record consulted on every pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub category: SettingCategory,
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: impl Into<String>, category: SettingCategory) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            category,
            updated_at: Utc::now(),
        }
    }
}

/// Keys understood by the pipeline.
pub mod keys {
    use super::SettingCategory;

    pub const LLM_MODEL: &str = "llm_model";
    pub const CHUNK_SIZE: &str = "chunk_size";
    pub const CHUNK_OVERLAP: &str = "chunk_overlap";
    pub const TOP_K: &str = "top_k";
    pub const CONTEXT_TOKEN_BUDGET: &str = "context_token_budget";
    pub const MAX_OUTPUT_TOKENS: &str = "max_output_tokens";

    pub const ALL: [&str; 6] = [
        LLM_MODEL,
        CHUNK_SIZE,
        CHUNK_OVERLAP,
        TOP_K,
        CONTEXT_TOKEN_BUDGET,
        MAX_OUTPUT_TOKENS,
    ];

    pub fn category(key: &str) -> SettingCategory {
        match key {
            LLM_MODEL | CONTEXT_TOKEN_BUDGET | MAX_OUTPUT_TOKENS => SettingCategory::Llm,
            TOP_K => SettingCategory::Retrieval,
            CHUNK_SIZE | CHUNK_OVERLAP => SettingCategory::Chunking,
            _ => SettingCategory::General,
        }
    }
}
