use crate::domain::{errors::DomainError, Embedding, IndexedChunk, SearchResult};
use async_trait::async_trait;
use uuid::Uuid;

/// Cosine-similarity index over chunk embeddings.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Writes every chunk of a document in a single call.
    async fn upsert(&self, document_id: Uuid, chunks: &[IndexedChunk]) -> Result<(), DomainError>;
    async fn search(&self, query: &Embedding, top_k: usize)
        -> Result<Vec<SearchResult>, DomainError>;
    async fn delete_by_document(&self, document_id: Uuid) -> Result<(), DomainError>;
    fn dimension(&self) -> usize;
}
