use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::{Document, DocumentChunk, DocumentFailure, DocumentStatus, DomainError};

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub content: String,
    pub content_type: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub title: String,
    pub content_type: String,
    pub size_bytes: usize,
    pub status: DocumentStatus,
    pub failure: Option<DocumentFailure>,
    pub chunk_count: usize,
    pub metadata: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            content_type: doc.content_type,
            size_bytes: doc.size_bytes,
            status: doc.status,
            failure: doc.failure,
            chunk_count: doc.chunk_count,
            metadata: doc.metadata,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub id: Uuid,
    pub chunk_index: usize,
    pub start: usize,
    pub end: usize,
    pub content: String,
    pub embedded: bool,
}

impl From<DocumentChunk> for ChunkResponse {
    fn from(chunk: DocumentChunk) -> Self {
        Self {
            id: chunk.id,
            chunk_index: chunk.chunk_index,
            start: chunk.start,
            end: chunk.end,
            embedded: chunk.embedding.is_some(),
            content: chunk.content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentDetailResponse {
    #[serde(flatten)]
    pub document: DocumentResponse,
    pub chunks: Vec<ChunkResponse>,
}

#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub document: DocumentResponse,
    pub job_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchDocumentsRequest {
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultResponse {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub chunk_index: usize,
    pub content: String,
    pub score: f32,
}

async fn enqueue(state: &AppState, doc: Document) -> Result<AcceptedResponse, ApiError> {
    let job_id = state.job_queue.enqueue_ingest(doc.id).await?;
    Ok(AcceptedResponse {
        document: DocumentResponse::from(doc),
        job_id,
    })
}

pub async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<AcceptedResponse>), ApiError> {
    let doc = state
        .document_service
        .create(
            &request.title,
            &request.content,
            request.content_type.as_deref(),
            request.metadata.unwrap_or_else(|| serde_json::json!({})),
        )
        .await?;

    Ok((StatusCode::ACCEPTED, Json(enqueue(&state, doc).await?)))
}

/// Accepts a `file` part and an optional `title` part. The file must be
/// UTF-8 text.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AcceptedResponse>), ApiError> {
    let mut title = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DomainError::validation(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| DomainError::validation(e.to_string()))?,
                );
            }
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| DomainError::validation(e.to_string()))?;
                file = Some((file_name, content_type, bytes));
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| DomainError::validation("missing `file` part"))?;
    let content = String::from_utf8(bytes.to_vec())
        .map_err(|_| DomainError::validation("uploaded file is not UTF-8 text"))?;
    let title = title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| file_name.clone())
        .unwrap_or_else(|| "untitled".to_string());

    let doc = state
        .document_service
        .create(
            &title,
            &content,
            content_type.as_deref(),
            serde_json::json!({ "file_name": file_name }),
        )
        .await?;

    Ok((StatusCode::ACCEPTED, Json(enqueue(&state, doc).await?)))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentDetailResponse>, ApiError> {
    let (doc, chunks) = state
        .document_service
        .get_with_chunks(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("document {id}")))?;

    Ok(Json(DocumentDetailResponse {
        document: DocumentResponse::from(doc),
        chunks: chunks.into_iter().map(ChunkResponse::from).collect(),
    }))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let docs = state
        .document_service
        .list(limit, query.offset.unwrap_or(0))
        .await?;

    Ok(Json(docs.into_iter().map(DocumentResponse::from).collect()))
}

pub async fn reprocess_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<AcceptedResponse>), ApiError> {
    let doc = state
        .document_service
        .get(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("document {id}")))?;

    if doc.status == DocumentStatus::Processing && !state.document_service.is_stalled(&doc) {
        return Err(DomainError::validation(format!("document {id} is already processing")).into());
    }

    Ok((StatusCode::ACCEPTED, Json(enqueue(&state, doc).await?)))
}

pub async fn search_documents(
    State(state): State<AppState>,
    Json(request): Json<SearchDocumentsRequest>,
) -> Result<Json<Vec<SearchResultResponse>>, ApiError> {
    let results = match request.top_k {
        Some(top_k) => {
            state
                .rag_service
                .retrieve_top_k(&request.query, top_k)
                .await?
        }
        None => state.rag_service.retrieve(&request.query).await?,
    };

    Ok(Json(
        results
            .into_iter()
            .map(|r| SearchResultResponse {
                chunk_id: r.chunk.id,
                document_id: r.chunk.document_id,
                chunk_index: r.chunk.chunk_index,
                content: r.chunk.content,
                score: r.score,
            })
            .collect(),
    ))
}
