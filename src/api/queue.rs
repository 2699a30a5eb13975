use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use uuid::Uuid;

use crate::domain::{ports::JobQueue, DomainError, Stage};
use crate::infrastructure::{keys, queues, IngestDocumentJob, JobResult};

pub type RedisPool = Pool;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis pool error: {0}")]
    Pool(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<QueueError> for DomainError {
    fn from(e: QueueError) -> Self {
        match e {
            QueueError::Serialization(e) => DomainError::internal(e.to_string()),
            other => DomainError::transient(Stage::Storage, other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, QueueError>;

pub fn create_pool(redis_url: &str) -> Result<RedisPool> {
    let cfg = Config::from_url(redis_url);
    cfg.create_pool(Some(Runtime::Tokio1))
        .map_err(|e| QueueError::Pool(e.to_string()))
}

/// Looks up the status record the worker keeps for each job.
#[async_trait]
pub trait JobStatusLookup: Send + Sync {
    async fn job_status(&self, job_id: &Uuid) -> std::result::Result<Option<JobResult>, DomainError>;
}

#[derive(Clone)]
pub struct JobProducer {
    pool: RedisPool,
    result_ttl_seconds: u64,
}

impl JobProducer {
    pub fn new(pool: RedisPool, result_ttl_seconds: u64) -> Self {
        Self {
            pool,
            result_ttl_seconds,
        }
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| QueueError::Pool(e.to_string()))
    }

    pub async fn push_ingest_job(&self, job: &IngestDocumentJob) -> Result<Uuid> {
        let mut conn = self.conn().await?;
        let payload = serde_json::to_string(job)?;

        let status = serde_json::to_string(&JobResult::pending(job))?;
        conn.set_ex::<_, _, ()>(keys::job_status(&job.job_id), &status, self.result_ttl_seconds)
            .await
            .map_err(|e| QueueError::Redis(e.to_string()))?;

        conn.lpush::<_, _, ()>(queues::INGEST_QUEUE, payload)
            .await
            .map_err(|e| QueueError::Redis(e.to_string()))?;

        tracing::info!(
            job_id = %job.job_id,
            document_id = %job.document_id,
            queue = queues::INGEST_QUEUE,
            "job queued"
        );
        Ok(job.job_id)
    }

    pub async fn get_job_status(&self, job_id: &Uuid) -> Result<Option<JobResult>> {
        let mut conn = self.conn().await?;
        let result: Option<String> = conn
            .get(keys::job_status(job_id))
            .await
            .map_err(|e| QueueError::Redis(e.to_string()))?;

        result
            .map(|json| serde_json::from_str(&json).map_err(Into::into))
            .transpose()
    }
}

#[async_trait]
impl JobQueue for JobProducer {
    async fn enqueue_ingest(&self, document_id: Uuid) -> std::result::Result<Uuid, DomainError> {
        let job = IngestDocumentJob::new(document_id);
        Ok(self.push_ingest_job(&job).await?)
    }
}

#[async_trait]
impl JobStatusLookup for JobProducer {
    async fn job_status(&self, job_id: &Uuid) -> std::result::Result<Option<JobResult>, DomainError> {
        Ok(self.get_job_status(job_id).await?)
    }
}
