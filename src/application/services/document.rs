use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::application::{LayeredSettings, RetryPolicy, TokenizerRegistry};
use crate::domain::{
    chunk_document,
    ports::{DocumentStore, EmbeddingService, Tokenizer, VectorStore},
    truncate_to_tokens, Document, DocumentChunk, DocumentStatus, DomainError, Embedding,
    IndexedChunk, Stage,
};

/// Runs documents through `pending -> processing -> indexed | failed`.
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    tokenizers: TokenizerRegistry,
    settings: Arc<LayeredSettings>,
    retry: RetryPolicy,
    embedding_concurrency: usize,
    stale_after: Duration,
}

/// Error plus whatever chunks were computed before it happened.
struct PipelineFailure {
    error: DomainError,
    chunks: Vec<DocumentChunk>,
}

impl PipelineFailure {
    fn new(error: DomainError, chunks: Vec<DocumentChunk>) -> Self {
        Self { error, chunks }
    }
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        tokenizers: TokenizerRegistry,
        settings: Arc<LayeredSettings>,
    ) -> Self {
        Self {
            store,
            embedding,
            vector_store,
            tokenizers,
            settings,
            retry: RetryPolicy::default(),
            embedding_concurrency: 1,
            stale_after: Duration::minutes(15),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Number of chunk embeddings requested at once. All of them are awaited
    /// before anything is indexed.
    pub fn with_embedding_concurrency(mut self, concurrency: usize) -> Self {
        self.embedding_concurrency = concurrency.max(1);
        self
    }

    /// How long a document may sit in `processing` before it is treated as
    /// abandoned and may be processed again.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// True when the document is `processing` but has not been touched for
    /// longer than the stale threshold, e.g. after a worker crash.
    pub fn is_stalled(&self, doc: &Document) -> bool {
        doc.status == DocumentStatus::Processing && Utc::now() - doc.updated_at > self.stale_after
    }

    #[instrument(skip(self, content, metadata))]
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        content_type: Option<&str>,
        metadata: serde_json::Value,
    ) -> Result<Document, DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::validation("document title is required"));
        }
        if content.trim().is_empty() {
            return Err(DomainError::validation("document content is empty"));
        }

        let mut doc = Document::new(title.trim(), content).with_metadata(metadata);
        if let Some(content_type) = content_type {
            doc = doc.with_content_type(content_type);
        }
        self.store.save_document(&doc).await?;

        info!(document_id = %doc.id, size_bytes = doc.size_bytes, "document created");
        Ok(doc)
    }

    /// Creates a document and processes it right away.
    #[instrument(skip(self, content))]
    pub async fn ingest(
        &self,
        title: &str,
        content: &str,
    ) -> Result<(Document, Vec<DocumentChunk>), DomainError> {
        let doc = self.create(title, content, None, serde_json::json!({})).await?;
        let doc = self.process(doc.id).await?;
        let chunks = self.store.get_chunks(doc.id).await?;
        Ok((doc, chunks))
    }

    /// Chunks, embeds and indexes a stored document.
    ///
    /// On failure the document is marked failed, nothing of it is left in the
    /// vector index, and the error is returned with its stage attached.
    #[instrument(skip(self), fields(document_id = %id))]
    pub async fn process(&self, id: Uuid) -> Result<Document, DomainError> {
        let mut doc = self
            .store
            .get_document(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("document {id}")))?;

        if self.is_stalled(&doc) {
            warn!(document_id = %doc.id, since = %doc.updated_at, "recovering stalled document");
            doc.mark_failed(&DomainError::internal("processing was interrupted"))?;
        }
        doc.start_processing()?;
        self.store.save_document(&doc).await?;

        let failure = match self.run_pipeline(&doc).await {
            Ok(chunks) => {
                let committed = self.commit(&doc, &chunks).await;
                match committed {
                    Ok(indexed) => {
                        info!(document_id = %doc.id, chunks = chunks.len(), "document indexed");
                        return Ok(indexed);
                    }
                    Err(e) => {
                        PipelineFailure::new(e.in_pipeline(Stage::Indexing, doc.id, None), chunks)
                    }
                }
            }
            Err(failure) => failure,
        };
        self.fail(doc, failure).await
    }

    /// Records chunks and the `indexed` status once the index holds them.
    async fn commit(
        &self,
        doc: &Document,
        chunks: &[DocumentChunk],
    ) -> Result<Document, DomainError> {
        self.store.save_chunks(doc.id, chunks).await?;
        let mut indexed = doc.clone();
        indexed.mark_indexed(chunks.len())?;
        self.store.save_document(&indexed).await?;
        Ok(indexed)
    }

    async fn fail(
        &self,
        mut doc: Document,
        failure: PipelineFailure,
    ) -> Result<Document, DomainError> {
        let err = failure.error;
        error!(
            document_id = %doc.id,
            stage = err.stage().map(|s| s.as_str()).unwrap_or("unknown"),
            reason = ?err.reason_code(),
            error = %err,
            "document processing failed"
        );

        if let Err(e) = self.vector_store.delete_by_document(doc.id).await {
            warn!(document_id = %doc.id, error = %e, "failed to clear index entries");
        }
        if let Err(e) = self.store.save_chunks(doc.id, &failure.chunks).await {
            warn!(document_id = %doc.id, error = %e, "failed to keep diagnostic chunks");
        }

        doc.mark_failed(&err)?;
        if let Err(e) = self.store.save_document(&doc).await {
            // Left in `processing`; picked up again once stale.
            warn!(document_id = %doc.id, error = %e, "failed to record document failure");
        }
        Err(err)
    }

    async fn run_pipeline(&self, doc: &Document) -> Result<Vec<DocumentChunk>, PipelineFailure> {
        let document_id = doc.id;
        let stage_err = |stage: Stage, chunk: Option<usize>| {
            move |e: DomainError| e.in_pipeline(stage, document_id, chunk)
        };

        let settings = self
            .settings
            .resolve()
            .await
            .map_err(stage_err(Stage::Chunking, None))
            .map_err(|e| PipelineFailure::new(e, Vec::new()))?;

        let mut chunks = chunk_document(doc, &settings.chunking);
        if chunks.is_empty() {
            let err = DomainError::validation("document has no text to index");
            return Err(PipelineFailure::new(
                stage_err(Stage::Chunking, None)(err),
                chunks,
            ));
        }
        debug!(document_id = %document_id, chunks = chunks.len(), "document chunked");

        // Nothing from an earlier run may stay searchable while this one is
        // in flight.
        if let Err(e) = self
            .retry
            .run(Stage::Indexing, || self.vector_store.delete_by_document(document_id))
            .await
        {
            return Err(PipelineFailure::new(stage_err(Stage::Indexing, None)(e), chunks));
        }

        let tokenizer = match self.tokenizers.get(self.embedding.model()) {
            Ok(tokenizer) => tokenizer,
            Err(e) => {
                return Err(PipelineFailure::new(stage_err(Stage::Embedding, None)(e), chunks))
            }
        };

        let (embeddings, failed) = self.embed_chunks(document_id, tokenizer, &chunks).await;
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = Some(embedding);
        }
        if let Some(err) = failed {
            return Err(PipelineFailure::new(err, chunks));
        }

        let indexed: Vec<IndexedChunk> = chunks
            .iter()
            .filter_map(|chunk| {
                chunk.embedding.clone().map(|embedding| IndexedChunk {
                    chunk: DocumentChunk {
                        embedding: None,
                        ..chunk.clone()
                    },
                    embedding,
                })
            })
            .collect();

        if let Err(e) = self
            .retry
            .run(Stage::Indexing, || self.vector_store.upsert(document_id, &indexed))
            .await
        {
            return Err(PipelineFailure::new(stage_err(Stage::Indexing, None)(e), chunks));
        }

        Ok(chunks)
    }

    /// Embeds chunks in order. Returns the embeddings obtained before the
    /// first failure, and that failure if there was one.
    ///
    /// Each request owns its inputs; the future must stay `Send` for the
    /// worker's spawned tasks.
    async fn embed_chunks(
        &self,
        document_id: Uuid,
        tokenizer: Arc<dyn Tokenizer>,
        chunks: &[DocumentChunk],
    ) -> (Vec<Embedding>, Option<DomainError>) {
        let requests: Vec<_> = chunks
            .iter()
            .map(|chunk| {
                let tokenizer = tokenizer.clone();
                let chunk_index = chunk.chunk_index;
                let content = chunk.content.clone();
                async move {
                    self.embed_chunk(tokenizer.as_ref(), chunk_index, &content)
                        .await
                        .map_err(|e| e.in_pipeline(Stage::Embedding, document_id, Some(chunk_index)))
                }
            })
            .collect();

        let mut embeddings = Vec::with_capacity(requests.len());
        let mut results = stream::iter(requests).buffered(self.embedding_concurrency);
        while let Some(result) = results.next().await {
            match result {
                Ok(embedding) => embeddings.push(embedding),
                Err(e) => return (embeddings, Some(e)),
            }
        }
        (embeddings, None)
    }

    async fn embed_chunk(
        &self,
        tokenizer: &dyn Tokenizer,
        chunk_index: usize,
        content: &str,
    ) -> Result<Embedding, DomainError> {
        let input = truncate_to_tokens(tokenizer, content, self.embedding.max_input_tokens())?;
        if input.truncated {
            debug!(
                chunk_index,
                tokens = input.tokens,
                "chunk truncated to embedding input limit"
            );
        }

        let embedding = self
            .retry
            .run(Stage::Embedding, || self.embedding.embed(&input.text))
            .await?;
        embedding.ensure_dimension(self.vector_store.dimension())?;
        Ok(embedding)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        self.store.get_document(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_with_chunks(
        &self,
        id: Uuid,
    ) -> Result<Option<(Document, Vec<DocumentChunk>)>, DomainError> {
        match self.store.get_document(id).await? {
            Some(doc) => {
                let chunks = self.store.get_chunks(id).await?;
                Ok(Some((doc, chunks)))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Document>, DomainError> {
        self.store.list_documents(limit, offset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReasonCode;
    use crate::infrastructure::{InMemoryDocumentStore, InMemoryVectorStore};
    use crate::testing::{self, CountingVectorStore, FakeEmbedding, DIMENSION, EMBEDDING_MODEL};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Document store whose chunk writes fail while `fail_chunks` is set.
    struct FlakyChunkStore {
        inner: InMemoryDocumentStore,
        fail_chunks: AtomicBool,
    }

    #[async_trait]
    impl DocumentStore for FlakyChunkStore {
        async fn save_document(&self, doc: &Document) -> Result<(), DomainError> {
            self.inner.save_document(doc).await
        }

        async fn get_document(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
            self.inner.get_document(id).await
        }

        async fn list_documents(
            &self,
            limit: usize,
            offset: usize,
        ) -> Result<Vec<Document>, DomainError> {
            self.inner.list_documents(limit, offset).await
        }

        async fn save_chunks(
            &self,
            document_id: Uuid,
            chunks: &[DocumentChunk],
        ) -> Result<(), DomainError> {
            if self.fail_chunks.load(Ordering::SeqCst) {
                return Err(DomainError::transient(Stage::Storage, "redis down"));
            }
            self.inner.save_chunks(document_id, chunks).await
        }

        async fn get_chunks(&self, document_id: Uuid) -> Result<Vec<DocumentChunk>, DomainError> {
            self.inner.get_chunks(document_id).await
        }
    }

    fn assert_send<T: Send>(_: &T) {}

    struct Fixture {
        store: Arc<InMemoryDocumentStore>,
        embedding: Arc<FakeEmbedding>,
        vectors: Arc<InMemoryVectorStore>,
        service: DocumentService,
    }

    fn fixture(embedding: FakeEmbedding, env: &[(&str, &str)]) -> Fixture {
        let store = Arc::new(InMemoryDocumentStore::new());
        let embedding = Arc::new(embedding);
        let vectors = Arc::new(InMemoryVectorStore::new(DIMENSION));
        let service = DocumentService::new(
            store.clone(),
            embedding.clone(),
            vectors.clone(),
            testing::tokenizers(),
            Arc::new(testing::settings(env)),
        )
        .with_retry_policy(testing::fast_retry());
        Fixture {
            store,
            embedding,
            vectors,
            service,
        }
    }

    fn greek_text() -> String {
        // 30 chars; chunk_size 10, overlap 2 => windows at 0, 8, 16, 24
        "alpha beta gamma delta epsilon".to_string()
    }

    #[tokio::test]
    async fn test_ingest_indexes_all_chunks() {
        let f = fixture(FakeEmbedding::new(), &[("CHUNK_SIZE", "10"), ("CHUNK_OVERLAP", "2")]);
        let (doc, chunks) = f.service.ingest("Greek", &greek_text()).await.unwrap();

        assert_eq!(doc.status, DocumentStatus::Indexed);
        assert_eq!(doc.chunk_count, chunks.len());
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.embedding.is_some()));
        assert_eq!(f.vectors.count_for(doc.id), 4);
        assert_eq!(f.embedding.calls(), 4);
    }

    #[tokio::test]
    async fn test_embedding_failure_marks_document_failed() {
        let f = fixture(
            FakeEmbedding::new().fail_transient_on("XX"),
            &[("CHUNK_SIZE", "10"), ("CHUNK_OVERLAP", "0")],
        );
        let text = format!("{}{}{}", "a".repeat(10), "bbbbXXbbbb", "c".repeat(10));
        let doc = f
            .service
            .create("three chunks", &text, None, serde_json::json!({}))
            .await
            .unwrap();

        let err = f.service.process(doc.id).await.unwrap_err();
        match &err {
            DomainError::Pipeline {
                stage,
                chunk_index,
                source,
                ..
            } => {
                assert_eq!(*stage, Stage::Embedding);
                assert_eq!(*chunk_index, Some(1));
                assert!(matches!(**source, DomainError::RetriesExhausted { .. }));
            }
            other => panic!("unexpected: {other:?}"),
        }

        let stored = f.store.get_document(doc.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DocumentStatus::Failed);
        assert_eq!(
            stored.failure.as_ref().unwrap().reason,
            ReasonCode::EmbeddingFailed
        );
        assert_eq!(f.vectors.count_for(doc.id), 0);

        let query = f.embedding.embed(&"a".repeat(10)).await.unwrap();
        let hits = f.vectors.search(&query, 10).await.unwrap();
        assert!(hits.iter().all(|h| h.chunk.document_id != doc.id));

        // Diagnostics: first chunk kept its embedding, later ones never got one.
        let kept = f.store.get_chunks(doc.id).await.unwrap();
        assert_eq!(kept.len(), 3);
        assert!(kept[0].embedding.is_some());
        assert!(kept[1].embedding.is_none());
        assert!(kept[2].embedding.is_none());
    }

    #[tokio::test]
    async fn test_failure_removes_previous_index_entries() {
        let f = fixture(
            FakeEmbedding::new().fail_permanent_on("broken"),
            &[("CHUNK_SIZE", "50"), ("CHUNK_OVERLAP", "5")],
        );
        let doc = f
            .service
            .create("doc", "fine text", None, serde_json::json!({}))
            .await
            .unwrap();
        f.service.process(doc.id).await.unwrap();
        assert_eq!(f.vectors.count_for(doc.id), 1);

        let mut edited = f.store.get_document(doc.id).await.unwrap().unwrap();
        edited.content = "now broken text".to_string();
        f.store.save_document(&edited).await.unwrap();

        let err = f.service.process(doc.id).await.unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(f.vectors.count_for(doc.id), 0);
        // Permanent errors are not retried.
        assert_eq!(f.embedding.calls(), 2);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_fails_before_indexing() {
        let f = fixture(
            FakeEmbedding::with_dimension(DIMENSION + 1),
            &[("CHUNK_SIZE", "50"), ("CHUNK_OVERLAP", "5")],
        );
        let doc = f
            .service
            .create("doc", "some text", None, serde_json::json!({}))
            .await
            .unwrap();

        let err = f.service.process(doc.id).await.unwrap_err();
        assert_eq!(err.reason_code(), ReasonCode::DimensionMismatch);
        assert_eq!(f.vectors.count_for(doc.id), 0);
    }

    #[tokio::test]
    async fn test_invalid_chunking_settings_fail_document() {
        let f = fixture(
            FakeEmbedding::new(),
            &[("CHUNK_SIZE", "10"), ("CHUNK_OVERLAP", "10")],
        );
        let doc = f
            .service
            .create("doc", "some text", None, serde_json::json!({}))
            .await
            .unwrap();

        let err = f.service.process(doc.id).await.unwrap_err();
        assert_eq!(err.reason_code(), ReasonCode::Configuration);
        assert_eq!(err.stage(), Some(Stage::Chunking));
        assert_eq!(f.embedding.calls(), 0);

        let stored = f.store.get_document(doc.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DocumentStatus::Failed);
    }

    #[tokio::test]
    async fn test_parallel_embedding_keeps_order() {
        let f = fixture(FakeEmbedding::new(), &[("CHUNK_SIZE", "4"), ("CHUNK_OVERLAP", "1")]);
        let service = f.service.with_embedding_concurrency(4);
        let (_, chunks) = service.ingest("doc", "abcdefghijklmnopqrstuvwxyz").await.unwrap();

        for chunk in &chunks {
            let expected = f.embedding.embed(&chunk.content).await.unwrap();
            assert_eq!(chunk.embedding.as_ref(), Some(&expected));
        }
    }

    #[tokio::test]
    async fn test_parallel_failure_indexes_nothing() {
        let vectors = Arc::new(CountingVectorStore::new(InMemoryVectorStore::new(DIMENSION)));
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = DocumentService::new(
            store.clone(),
            Arc::new(FakeEmbedding::new().fail_transient_on("XX")),
            vectors.clone(),
            testing::tokenizers(),
            Arc::new(testing::settings(&[("CHUNK_SIZE", "4"), ("CHUNK_OVERLAP", "0")])),
        )
        .with_retry_policy(testing::fast_retry())
        .with_embedding_concurrency(4);

        let doc = service
            .create("five chunks", "aaaabbbbcXXcddddeeee", None, serde_json::json!({}))
            .await
            .unwrap();
        let err = service.process(doc.id).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::Pipeline {
                stage: Stage::Embedding,
                chunk_index: Some(2),
                ..
            }
        ));
        assert_eq!(vectors.upsert_calls(), 0);
        assert_eq!(vectors.count_for(doc.id), 0);

        let stored = store.get_document(doc.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DocumentStatus::Failed);
        assert_eq!(
            stored.failure.as_ref().unwrap().reason,
            ReasonCode::EmbeddingFailed
        );

        let kept = store.get_chunks(doc.id).await.unwrap();
        assert_eq!(kept.len(), 5);
        assert!(kept[..2].iter().all(|c| c.embedding.is_some()));
        assert!(kept[2..].iter().all(|c| c.embedding.is_none()));
    }

    #[tokio::test]
    async fn test_chunk_write_failure_after_upsert_rolls_back() {
        let store = Arc::new(FlakyChunkStore {
            inner: InMemoryDocumentStore::new(),
            fail_chunks: AtomicBool::new(true),
        });
        let vectors = Arc::new(InMemoryVectorStore::new(DIMENSION));
        let service = DocumentService::new(
            store.clone(),
            Arc::new(FakeEmbedding::new()),
            vectors.clone(),
            testing::tokenizers(),
            Arc::new(testing::settings(&[("CHUNK_SIZE", "10"), ("CHUNK_OVERLAP", "2")])),
        )
        .with_retry_policy(testing::fast_retry());

        let doc = service
            .create("Greek", &greek_text(), None, serde_json::json!({}))
            .await
            .unwrap();
        let err = service.process(doc.id).await.unwrap_err();

        assert_eq!(err.reason_code(), ReasonCode::StorageFailed);
        assert_eq!(err.stage(), Some(Stage::Indexing));
        assert_eq!(vectors.count_for(doc.id), 0);
        let stored = store.get_document(doc.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DocumentStatus::Failed);

        store.fail_chunks.store(false, Ordering::SeqCst);
        let doc = service.process(doc.id).await.unwrap();
        assert_eq!(doc.status, DocumentStatus::Indexed);
        assert_eq!(vectors.count_for(doc.id), 4);
        assert_eq!(store.get_chunks(doc.id).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_stalled_processing_is_recovered() {
        let f = fixture(FakeEmbedding::new(), &[("CHUNK_SIZE", "50"), ("CHUNK_OVERLAP", "5")]);
        let doc = f
            .service
            .create("doc", "some text", None, serde_json::json!({}))
            .await
            .unwrap();

        let mut stuck = f.store.get_document(doc.id).await.unwrap().unwrap();
        stuck.start_processing().unwrap();
        f.store.save_document(&stuck).await.unwrap();
        assert!(!f.service.is_stalled(&stuck));
        let err = f.service.process(doc.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        stuck.updated_at = Utc::now() - Duration::hours(1);
        f.store.save_document(&stuck).await.unwrap();
        assert!(f.service.is_stalled(&stuck));
        let doc = f.service.process(doc.id).await.unwrap();
        assert_eq!(doc.status, DocumentStatus::Indexed);
        assert!(doc.failure.is_none());
    }

    #[tokio::test]
    async fn test_process_runs_on_spawned_task() {
        let f = fixture(FakeEmbedding::new(), &[("CHUNK_SIZE", "10"), ("CHUNK_OVERLAP", "2")]);
        let doc = f
            .service
            .create("Greek", &greek_text(), None, serde_json::json!({}))
            .await
            .unwrap();
        let service = Arc::new(f.service.with_embedding_concurrency(3));
        assert_send(&service.process(doc.id));

        let task = tokio::spawn({
            let service = service.clone();
            async move { service.process(doc.id).await }
        });
        let processed = task.await.unwrap().unwrap();
        assert_eq!(processed.status, DocumentStatus::Indexed);
        assert_eq!(f.vectors.count_for(doc.id), 4);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content() {
        let f = fixture(FakeEmbedding::new(), &[]);
        let err = f
            .service
            .create("doc", "   ", None, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_process_unknown_document() {
        let f = fixture(FakeEmbedding::new(), &[]);
        let err = f.service.process(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_embedding_model_constant_is_registered() {
        assert!(testing::tokenizers().get(EMBEDDING_MODEL).is_ok());
    }
}
