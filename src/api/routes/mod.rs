pub mod documents;
pub mod health;
pub mod jobs;
pub mod query;
pub mod settings;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::{middleware, routing::get, routing::post, routing::put, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::middleware::request_logger;
use crate::api::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.cors.allowed_origins);
    let body_limit = state.config.config.server.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_v1_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/documents",
            post(documents::create_document).get(documents::list_documents),
        )
        .route("/documents/upload", post(documents::upload_document))
        .route("/documents/search", post(documents::search_documents))
        .route("/documents/{id}", get(documents::get_document))
        .route(
            "/documents/{id}/reprocess",
            post(documents::reprocess_document),
        )
        .route("/query", post(query::query_handler))
        .route("/settings", get(settings::list_settings))
        .route("/settings/{key}", put(settings::update_setting))
        .route("/jobs/{job_id}", get(jobs::get_job_status))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::api::queue::JobStatusLookup;
    use crate::application::{DocumentService, RagService};
    use crate::domain::{
        ports::{DocumentStore, JobQueue},
        DomainError,
    };
    use crate::infrastructure::{
        AppConfig, InMemoryDocumentStore, InMemorySettingsStore, InMemoryVectorStore,
        IngestDocumentJob, JobResult,
    };
    use crate::testing::{self, FakeEmbedding, FakeLlm, DIMENSION};

    #[derive(Default)]
    struct RecordingQueue {
        jobs: Mutex<HashMap<Uuid, JobResult>>,
    }

    impl RecordingQueue {
        fn queued_documents(&self) -> Vec<Uuid> {
            self.jobs
                .lock()
                .unwrap()
                .values()
                .map(|j| j.document_id)
                .collect()
        }
    }

    #[async_trait]
    impl JobQueue for RecordingQueue {
        async fn enqueue_ingest(&self, document_id: Uuid) -> Result<Uuid, DomainError> {
            let job = IngestDocumentJob::new(document_id);
            self.jobs
                .lock()
                .unwrap()
                .insert(job.job_id, JobResult::pending(&job));
            Ok(job.job_id)
        }
    }

    #[async_trait]
    impl JobStatusLookup for RecordingQueue {
        async fn job_status(&self, job_id: &Uuid) -> Result<Option<JobResult>, DomainError> {
            Ok(self.jobs.lock().unwrap().get(job_id).cloned())
        }
    }

    struct Harness {
        router: Router,
        documents: Arc<DocumentService>,
        store: Arc<InMemoryDocumentStore>,
        queue: Arc<RecordingQueue>,
    }

    fn harness() -> Harness {
        let settings_store = Arc::new(InMemorySettingsStore::new());
        let settings = Arc::new(testing::settings_with_store(settings_store.clone(), &[]));
        let embedding = Arc::new(FakeEmbedding::new());
        let vectors = Arc::new(InMemoryVectorStore::new(DIMENSION));
        let store = Arc::new(InMemoryDocumentStore::new());

        let documents = Arc::new(
            DocumentService::new(
                store.clone(),
                embedding.clone(),
                vectors.clone(),
                testing::tokenizers(),
                settings.clone(),
            )
            .with_retry_policy(testing::fast_retry()),
        );
        let rag = Arc::new(
            RagService::new(
                embedding,
                vectors,
                Arc::new(FakeLlm::new("grounded answer")),
                testing::tokenizers(),
                settings.clone(),
            )
            .with_retry_policy(testing::fast_retry()),
        );
        let queue = Arc::new(RecordingQueue::default());

        let state = AppState::new(
            documents.clone(),
            rag,
            settings_store,
            settings,
            AppConfig::default(),
        )
        .with_job_queue(queue.clone());

        Harness {
            router: create_router(state),
            documents,
            store,
            queue,
        }
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let h = harness();

        let (status, body) = send(&h.router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&h.router, "GET", "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["redis"], "not_configured");
    }

    #[tokio::test]
    async fn test_create_document_enqueues_job() {
        let h = harness();

        let (status, body) = send(
            &h.router,
            "POST",
            "/api/v1/documents",
            Some(json!({ "title": "notes", "content": "some text" })),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["document"]["status"], "pending");
        let doc_id: Uuid = body["document"]["id"].as_str().unwrap().parse().unwrap();
        assert_eq!(h.queue.queued_documents(), vec![doc_id]);

        let job_id = body["job_id"].as_str().unwrap();
        let (status, job) = send(&h.router, "GET", &format!("/api/v1/jobs/{job_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["status"], "pending");
    }

    #[tokio::test]
    async fn test_create_document_rejects_empty_content() {
        let h = harness();

        let (status, body) = send(
            &h.router,
            "POST",
            "/api/v1/documents",
            Some(json!({ "title": "notes", "content": "  " })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "validation");
        assert!(h.queue.queued_documents().is_empty());
    }

    #[tokio::test]
    async fn test_upload_multipart() {
        let h = harness();
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             uploaded body text\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/documents/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = h.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["document"]["title"], "notes.txt");
        assert_eq!(json["document"]["content_type"], "text/plain");
        assert_eq!(json["document"]["size_bytes"], 18);
    }

    #[tokio::test]
    async fn test_get_document_with_chunks() {
        let h = harness();
        let (doc, _) = h.documents.ingest("notes", "rust ownership").await.unwrap();

        let (status, body) =
            send(&h.router, "GET", &format!("/api/v1/documents/{}", doc.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "indexed");
        assert_eq!(body["chunks"].as_array().unwrap().len(), 1);
        assert_eq!(body["chunks"][0]["embedded"], true);

        let (status, body) = send(
            &h.router,
            "GET",
            &format!("/api/v1/documents/{}", Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["reason"], "not_found");
    }

    #[tokio::test]
    async fn test_list_and_reprocess() {
        let h = harness();
        let (doc, _) = h.documents.ingest("notes", "rust ownership").await.unwrap();

        let (status, body) = send(&h.router, "GET", "/api/v1/documents?limit=10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) = send(
            &h.router,
            "POST",
            &format!("/api/v1/documents/{}/reprocess", doc.id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(h.queue.queued_documents(), vec![doc.id]);
    }

    #[tokio::test]
    async fn test_reprocess_only_stalled_processing() {
        let h = harness();
        let mut doc = h
            .documents
            .create("notes", "rust ownership", None, json!({}))
            .await
            .unwrap();
        doc.start_processing().unwrap();
        h.store.save_document(&doc).await.unwrap();
        let uri = format!("/api/v1/documents/{}/reprocess", doc.id);

        let (status, body) = send(&h.router, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "validation");

        doc.updated_at = chrono::Utc::now() - chrono::Duration::hours(1);
        h.store.save_document(&doc).await.unwrap();
        let (status, _) = send(&h.router, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(h.queue.queued_documents(), vec![doc.id]);
    }

    #[tokio::test]
    async fn test_search_returns_scored_chunks() {
        let h = harness();
        h.documents.ingest("a", "rust ownership").await.unwrap();
        h.documents.ingest("b", "gardening tips").await.unwrap();

        let (status, body) = send(
            &h.router,
            "POST",
            "/api/v1/documents/search",
            Some(json!({ "query": "rust ownership", "top_k": 1 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let results = body.as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["content"], "rust ownership");
    }

    #[tokio::test]
    async fn test_query_answers_with_sources() {
        let h = harness();
        h.documents.ingest("a", "rust ownership").await.unwrap();

        let (status, body) = send(
            &h.router,
            "POST",
            "/api/v1/query",
            Some(json!({ "query": "rust ownership" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "grounded answer");
        assert_eq!(body["sources"][0]["content"], "rust ownership");
    }

    #[tokio::test]
    async fn test_query_failure_is_reason_coded() {
        let h = harness();

        let (status, body) = send(
            &h.router,
            "POST",
            "/api/v1/query",
            Some(json!({ "query": " " })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "error": "could not produce an answer", "reason": "validation" })
        );
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let h = harness();

        let (status, body) = send(
            &h.router,
            "PUT",
            "/api/v1/settings/top_k",
            Some(json!({ "value": "3" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["value"], "3");
        assert_eq!(body["source"], "store");

        let (status, body) = send(&h.router, "GET", "/api/v1/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        let all = body.as_array().unwrap();
        assert_eq!(all.len(), 6);
        let overlap = all.iter().find(|s| s["key"] == "chunk_overlap").unwrap();
        assert_eq!(overlap["source"], "defaults");
        assert_eq!(overlap["category"], "chunking");
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected() {
        let h = harness();

        let (status, _) = send(
            &h.router,
            "PUT",
            "/api/v1/settings/chunk_overlap",
            Some(json!({ "value": "1000" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &h.router,
            "PUT",
            "/api/v1/settings/llm_model",
            Some(json!({ "value": "unknown-model" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &h.router,
            "PUT",
            "/api/v1/settings/colour",
            Some(json!({ "value": "blue" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let h = harness();
        let (status, _) = send(
            &h.router,
            "GET",
            &format!("/api/v1/jobs/{}", Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
