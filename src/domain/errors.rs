use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Chunking,
    Embedding,
    Indexing,
    Search,
    Generation,
    Storage,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chunking => "chunking",
            Self::Embedding => "embedding",
            Self::Indexing => "indexing",
            Self::Search => "search",
            Self::Generation => "generation",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network trouble, timeouts, rate limits. Worth retrying.
    Transient,
    /// Bad input or credentials. Retrying cannot help.
    Permanent,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => f.write_str("transient"),
            Self::Permanent => f.write_str("permanent"),
        }
    }
}

/// Machine-readable failure category exposed to API clients and stored on
/// failed documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    Configuration,
    Validation,
    NotFound,
    ChunkingFailed,
    EmbeddingFailed,
    IndexingFailed,
    SearchFailed,
    GenerationFailed,
    StorageFailed,
    InputTooLarge,
    DimensionMismatch,
    Internal,
}

impl ReasonCode {
    fn for_stage(stage: Stage) -> Self {
        match stage {
            Stage::Chunking => Self::ChunkingFailed,
            Stage::Embedding => Self::EmbeddingFailed,
            Stage::Indexing => Self::IndexingFailed,
            Stage::Search => Self::SearchFailed,
            Stage::Generation => Self::GenerationFailed,
            Stage::Storage => Self::StorageFailed,
        }
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{stage} call failed ({kind}): {message}")]
    Capability {
        stage: Stage,
        kind: FailureKind,
        message: String,
    },

    #[error("{stage} input too large: {tokens} tokens exceeds limit of {limit}")]
    InputTooLarge {
        stage: Stage,
        tokens: usize,
        limit: usize,
    },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        source: Box<DomainError>,
    },

    #[error("{stage} failed for document {document_id}{}: {source}", chunk_suffix(.chunk_index))]
    Pipeline {
        stage: Stage,
        document_id: Uuid,
        chunk_index: Option<usize>,
        #[source]
        source: Box<DomainError>,
    },
}

fn chunk_suffix(chunk_index: &Option<usize>) -> String {
    chunk_index
        .map(|i| format!(" (chunk {i})"))
        .unwrap_or_default()
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn transient(stage: Stage, msg: impl Into<String>) -> Self {
        Self::Capability {
            stage,
            kind: FailureKind::Transient,
            message: msg.into(),
        }
    }

    pub fn permanent(stage: Stage, msg: impl Into<String>) -> Self {
        Self::Capability {
            stage,
            kind: FailureKind::Permanent,
            message: msg.into(),
        }
    }

    pub fn timeout(stage: Stage, msg: impl Into<String>) -> Self {
        Self::transient(stage, format!("timed out: {}", msg.into()))
    }

    /// Classifies a provider error message. Context-length and credential
    /// failures are permanent, everything else is assumed transient.
    pub fn external(stage: Stage, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        let lower = msg.to_lowercase();
        let permanent = [
            "context length",
            "context_length",
            "maximum context",
            "too many tokens",
            "too long",
            "invalid api key",
            "invalid x-api-key",
            "unauthorized",
            "forbidden",
            "status 401",
            "status 403",
            "status code 401",
            "status code 403",
            "invalid_request",
        ]
        .iter()
        .any(|marker| lower.contains(marker));

        if permanent {
            Self::permanent(stage, msg)
        } else {
            Self::transient(stage, msg)
        }
    }

    pub fn in_pipeline(self, stage: Stage, document_id: Uuid, chunk_index: Option<usize>) -> Self {
        Self::Pipeline {
            stage,
            document_id,
            chunk_index,
            source: Box::new(self),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Capability {
                kind: FailureKind::Transient,
                ..
            }
        )
    }

    /// Stage the error is attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Capability { stage, .. }
            | Self::InputTooLarge { stage, .. }
            | Self::Pipeline { stage, .. } => Some(*stage),
            Self::RetriesExhausted { source, .. } => source.stage(),
            _ => None,
        }
    }

    pub fn reason_code(&self) -> ReasonCode {
        match self {
            Self::NotFound(_) => ReasonCode::NotFound,
            Self::Validation(_) => ReasonCode::Validation,
            Self::Configuration(_) => ReasonCode::Configuration,
            Self::Internal(_) => ReasonCode::Internal,
            Self::Capability { stage, .. } => ReasonCode::for_stage(*stage),
            Self::InputTooLarge { .. } => ReasonCode::InputTooLarge,
            Self::DimensionMismatch { .. } => ReasonCode::DimensionMismatch,
            Self::RetriesExhausted { source, .. } => source.reason_code(),
            Self::Pipeline { stage, source, .. } => match source.reason_code() {
                ReasonCode::Internal | ReasonCode::Validation => ReasonCode::for_stage(*stage),
                code => code,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
