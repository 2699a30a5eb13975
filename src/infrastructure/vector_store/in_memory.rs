use async_trait::async_trait;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    ports::VectorStore, DocumentChunk, DomainError, Embedding, IndexedChunk, SearchResult, Stage,
};

/// Brute-force cosine index held in process memory.
pub struct InMemoryVectorStore {
    dimension: usize,
    chunks: RwLock<Vec<(DocumentChunk, Embedding)>>,
}

impl InMemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            chunks: RwLock::new(Vec::new()),
        }
    }

    pub fn count_for(&self, document_id: Uuid) -> usize {
        self.chunks
            .read()
            .map(|store| {
                store
                    .iter()
                    .filter(|(c, _)| c.document_id == document_id)
                    .count()
            })
            .unwrap_or(0)
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, document_id: Uuid, chunks: &[IndexedChunk]) -> Result<(), DomainError> {
        // Validate the whole batch first so a bad vector leaves nothing behind.
        for item in chunks {
            if item.chunk.document_id != document_id {
                return Err(DomainError::permanent(
                    Stage::Indexing,
                    format!("chunk {} belongs to another document", item.chunk.id),
                ));
            }
            item.embedding.ensure_dimension(self.dimension)?;
        }

        let mut store = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        for item in chunks {
            store.retain(|(c, _)| c.id != item.chunk.id);
            store.push((item.chunk.clone(), item.embedding.clone()));
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        query.ensure_dimension(self.dimension)?;

        let store = self
            .chunks
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<SearchResult> = store
            .iter()
            .map(|(chunk, embedding)| SearchResult {
                chunk: chunk.clone(),
                score: query.cosine_similarity(embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn delete_by_document(&self, document_id: Uuid) -> Result<(), DomainError> {
        let mut store = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.retain(|(chunk, _)| chunk.document_id != document_id);
        Ok(())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
