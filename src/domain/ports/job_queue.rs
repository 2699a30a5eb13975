use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Hands document processing off to a worker.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Returns the id of the queued job.
    async fn enqueue_ingest(&self, document_id: Uuid) -> Result<Uuid, DomainError>;
}
