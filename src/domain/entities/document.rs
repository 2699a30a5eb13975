use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, ReasonCode};
use crate::domain::Embedding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Indexed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Indexed => "indexed",
            Self::Failed => "failed",
        }
    }

    /// Whether the document may move from `self` to `next`.
    ///
    /// Processing can be (re)started from any settled state; it can only
    /// end in `Indexed` or `Failed`.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        use DocumentStatus::*;
        matches!(
            (self, next),
            (Pending | Indexed | Failed, Processing) | (Processing, Indexed | Failed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub reason: ReasonCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub content_type: String,
    pub size_bytes: usize,
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<DocumentFailure>,
    #[serde(default)]
    pub chunk_count: usize,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        let content = content.into();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            size_bytes: content.len(),
            content,
            content_type: "text/plain".to_string(),
            status: DocumentStatus::Pending,
            failure: None,
            chunk_count: 0,
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_queryable(&self) -> bool {
        self.status == DocumentStatus::Indexed
    }

    pub fn start_processing(&mut self) -> Result<(), DomainError> {
        self.transition(DocumentStatus::Processing)?;
        self.failure = None;
        Ok(())
    }

    pub fn mark_indexed(&mut self, chunk_count: usize) -> Result<(), DomainError> {
        self.transition(DocumentStatus::Indexed)?;
        self.chunk_count = chunk_count;
        Ok(())
    }

    pub fn mark_failed(&mut self, error: &DomainError) -> Result<(), DomainError> {
        self.transition(DocumentStatus::Failed)?;
        self.chunk_count = 0;
        self.failure = Some(DocumentFailure {
            reason: error.reason_code(),
            message: error.to_string(),
        });
        Ok(())
    }

    fn transition(&mut self, next: DocumentStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::validation(format!(
                "document {} cannot move from {} to {}",
                self.id,
                self.status.as_str(),
                next.as_str()
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub chunk_index: usize,
    /// Char offset of the first character, inclusive.
    pub start: usize,
    /// Char offset past the last character.
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,
}

impl DocumentChunk {
    pub fn new(
        document_id: Uuid,
        content: impl Into<String>,
        chunk_index: usize,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            id: Self::id_for(document_id, chunk_index),
            document_id,
            content: content.into(),
            chunk_index,
            start,
            end,
            embedding: None,
        }
    }

    /// Stable id so reprocessing a document overwrites rather than duplicates.
    pub fn id_for(document_id: Uuid, chunk_index: usize) -> Uuid {
        Uuid::new_v5(&document_id, &(chunk_index as u64).to_be_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// A chunk paired with the vector it is indexed under.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk: DocumentChunk,
    pub embedding: Embedding,
}
