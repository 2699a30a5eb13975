use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::api::queue::{JobProducer, JobStatusLookup, RedisPool};
use crate::application::{DocumentService, LayeredSettings, RagService};
use crate::domain::ports::{JobQueue, SettingsStore};
use crate::domain::DomainError;
use crate::infrastructure::{AppConfig, JobResult};

#[derive(Clone)]
pub struct AppState {
    pub document_service: Arc<DocumentService>,
    pub rag_service: Arc<RagService>,
    pub settings_store: Arc<dyn SettingsStore>,
    pub settings: Arc<LayeredSettings>,
    pub job_queue: Arc<dyn JobQueue>,
    pub job_status: Arc<dyn JobStatusLookup>,
    /// Pinged by the readiness check when present.
    pub redis_pool: Option<RedisPool>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        document_service: Arc<DocumentService>,
        rag_service: Arc<RagService>,
        settings_store: Arc<dyn SettingsStore>,
        settings: Arc<LayeredSettings>,
        config: AppConfig,
    ) -> Self {
        Self {
            document_service,
            rag_service,
            settings_store,
            settings,
            job_queue: Arc::new(NoQueue),
            job_status: Arc::new(NoQueue),
            redis_pool: None,
            config: Arc::new(config),
        }
    }

    /// Uses Redis for the job queue, job status and readiness.
    pub fn with_redis(mut self, redis_pool: RedisPool) -> Self {
        let producer = Arc::new(JobProducer::new(
            redis_pool.clone(),
            self.config.config.worker.result_ttl_seconds,
        ));
        self.job_queue = producer.clone();
        self.job_status = producer;
        self.redis_pool = Some(redis_pool);
        self
    }

    pub fn with_job_queue<Q>(mut self, queue: Arc<Q>) -> Self
    where
        Q: JobQueue + JobStatusLookup + 'static,
    {
        self.job_queue = queue.clone();
        self.job_status = queue;
        self
    }
}

/// Placeholder until a queue is attached; every enqueue fails.
struct NoQueue;

#[async_trait]
impl JobQueue for NoQueue {
    async fn enqueue_ingest(&self, _document_id: Uuid) -> Result<Uuid, DomainError> {
        Err(DomainError::configuration("no job queue configured"))
    }
}

#[async_trait]
impl JobStatusLookup for NoQueue {
    async fn job_status(&self, _job_id: &Uuid) -> Result<Option<JobResult>, DomainError> {
        Ok(None)
    }
}
