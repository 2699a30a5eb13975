use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    ports::{DocumentStore, SettingsStore},
    Document, DocumentChunk, DomainError, Setting,
};

#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<Uuid, Document>>,
    chunks: RwLock<HashMap<Uuid, Vec<DocumentChunk>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save_document(&self, doc: &Document) -> Result<(), DomainError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        documents.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(documents.get(&id).cloned())
    }

    async fn list_documents(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Document>, DomainError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut all: Vec<Document> = documents.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    async fn save_chunks(
        &self,
        document_id: Uuid,
        chunks: &[DocumentChunk],
    ) -> Result<(), DomainError> {
        let mut store = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        store.insert(document_id, chunks.to_vec());
        Ok(())
    }

    async fn get_chunks(&self, document_id: Uuid) -> Result<Vec<DocumentChunk>, DomainError> {
        let store = self
            .chunks
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(store.get(&document_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemorySettingsStore {
    settings: RwLock<HashMap<String, Setting>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, DomainError> {
        let settings = self
            .settings
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(settings.get(key).cloned())
    }

    async fn put_setting(&self, setting: &Setting) -> Result<(), DomainError> {
        let mut settings = self
            .settings
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        settings.insert(setting.key.clone(), setting.clone());
        Ok(())
    }
}
