use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{errors::DomainError, Document, DocumentChunk};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save_document(&self, doc: &Document) -> Result<(), DomainError>;
    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, DomainError>;
    async fn list_documents(&self, limit: usize, offset: usize)
        -> Result<Vec<Document>, DomainError>;
    /// Replaces all stored chunks of the document.
    async fn save_chunks(&self, document_id: Uuid, chunks: &[DocumentChunk])
        -> Result<(), DomainError>;
    async fn get_chunks(&self, document_id: Uuid) -> Result<Vec<DocumentChunk>, DomainError>;
}
