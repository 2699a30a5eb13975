use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Connection, Pool};
use uuid::Uuid;

use crate::domain::{
    ports::{DocumentStore, SettingsStore},
    Document, DocumentChunk, DomainError, Setting, Stage,
};

pub mod keys {
    use uuid::Uuid;

    /// Sorted set of document ids scored by creation time.
    pub const DOCUMENTS: &str = "documents";
    pub const SETTINGS: &str = "settings";

    pub fn document(id: &Uuid) -> String {
        format!("document:{}", id)
    }

    pub fn chunks(id: &Uuid) -> String {
        format!("document:{}:chunks", id)
    }
}

async fn conn(pool: &Pool) -> Result<Connection, DomainError> {
    pool.get()
        .await
        .map_err(|e| DomainError::transient(Stage::Storage, e.to_string()))
}

fn storage_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::external(Stage::Storage, e.to_string())
}

fn decode_error(e: serde_json::Error) -> DomainError {
    DomainError::permanent(Stage::Storage, e.to_string())
}

/// Documents as JSON strings, chunks as one JSON array per document.
#[derive(Clone)]
pub struct RedisDocumentStore {
    pool: Pool,
}

impl RedisDocumentStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for RedisDocumentStore {
    async fn save_document(&self, doc: &Document) -> Result<(), DomainError> {
        let mut c = conn(&self.pool).await?;
        let json = serde_json::to_string(doc).map_err(decode_error)?;

        c.set::<_, _, ()>(keys::document(&doc.id), json)
            .await
            .map_err(storage_error)?;
        c.zadd::<_, _, _, ()>(
            keys::DOCUMENTS,
            doc.id.to_string(),
            doc.created_at.timestamp_millis(),
        )
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        let mut c = conn(&self.pool).await?;
        let json: Option<String> = c.get(keys::document(&id)).await.map_err(storage_error)?;

        json.map(|j| serde_json::from_str(&j).map_err(decode_error))
            .transpose()
    }

    async fn list_documents(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Document>, DomainError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let (start, stop) = page_range(limit, offset)?;
        let mut c = conn(&self.pool).await?;
        let ids: Vec<String> = c
            .zrevrange(keys::DOCUMENTS, start, stop)
            .await
            .map_err(storage_error)?;

        let mut documents = Vec::with_capacity(ids.len());
        for id in ids.iter().filter_map(|id| id.parse::<Uuid>().ok()) {
            let json: Option<String> = c.get(keys::document(&id)).await.map_err(storage_error)?;
            if let Some(json) = json {
                documents.push(serde_json::from_str(&json).map_err(decode_error)?);
            }
        }
        Ok(documents)
    }

    async fn save_chunks(
        &self,
        document_id: Uuid,
        chunks: &[DocumentChunk],
    ) -> Result<(), DomainError> {
        let mut c = conn(&self.pool).await?;
        let json = serde_json::to_string(chunks).map_err(decode_error)?;

        c.set::<_, _, ()>(keys::chunks(&document_id), json)
            .await
            .map_err(storage_error)
    }

    async fn get_chunks(&self, document_id: Uuid) -> Result<Vec<DocumentChunk>, DomainError> {
        let mut c = conn(&self.pool).await?;
        let json: Option<String> = c
            .get(keys::chunks(&document_id))
            .await
            .map_err(storage_error)?;

        match json {
            Some(j) => serde_json::from_str(&j).map_err(decode_error),
            None => Ok(Vec::new()),
        }
    }
}

/// Settings in a single hash, one JSON value per key.
#[derive(Clone)]
pub struct RedisSettingsStore {
    pool: Pool,
}

impl RedisSettingsStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for RedisSettingsStore {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, DomainError> {
        let mut c = conn(&self.pool).await?;
        let json: Option<String> = c
            .hget(keys::SETTINGS, key)
            .await
            .map_err(storage_error)?;

        json.map(|j| serde_json::from_str(&j).map_err(decode_error))
            .transpose()
    }

    async fn put_setting(&self, setting: &Setting) -> Result<(), DomainError> {
        let mut c = conn(&self.pool).await?;
        let json = serde_json::to_string(setting).map_err(decode_error)?;

        c.hset::<_, _, _, ()>(keys::SETTINGS, &setting.key, json)
            .await
            .map_err(storage_error)
    }
}

/// Inclusive `ZREVRANGE` bounds for a page. `limit` must be non-zero.
fn page_range(limit: usize, offset: usize) -> Result<(isize, isize), DomainError> {
    let out_of_range = || DomainError::validation(format!("offset {offset} is out of range"));
    let start = isize::try_from(offset).map_err(|_| out_of_range())?;
    let stop = isize::try_from(limit)
        .ok()
        .and_then(|limit| start.checked_add(limit - 1))
        .ok_or_else(out_of_range)?;
    Ok((start, stop))
}
