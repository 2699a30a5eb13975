use deadpool_redis::{redis::AsyncCommands, Connection, Pool};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::info;

use docsearch::api::queue::create_pool;
use docsearch::application::DocumentService;
use docsearch::infrastructure::{
    init_tracing, keys, queues, AppConfig, Components, IngestDocumentJob, JobResult,
};

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Redis pool error: {0}")]
    Pool(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Semaphore closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, WorkerError>;

pub struct WorkerState {
    pub redis_pool: Pool,
    pub documents: DocumentService,
    pub result_ttl_seconds: u64,
}

pub struct JobConsumer {
    state: Arc<WorkerState>,
    concurrency: u32,
}

impl JobConsumer {
    pub fn new(state: WorkerState, concurrency: usize) -> Self {
        Self {
            state: Arc::new(state),
            concurrency: u32::try_from(concurrency.max(1)).unwrap_or(u32::MAX),
        }
    }

    /// Pulls jobs until `shutdown` resolves, then waits for running jobs.
    pub async fn start(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tracing::info!(concurrency = self.concurrency, "consumer started");

        let state = self.state.clone();
        run_until(self.concurrency, shutdown, move || {
            let state = state.clone();
            async move { process_next_job(&state).await }
        })
        .await?;

        tracing::info!("consumer stopped");
        Ok(())
    }
}

/// Runs `step` on at most `concurrency` tasks at once until `shutdown`
/// resolves. Returns once every started step has finished.
async fn run_until<F, Fut>(
    concurrency: u32,
    shutdown: impl Future<Output = ()>,
    step: F,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency as usize));
    tokio::pin!(shutdown);

    loop {
        let permit = tokio::select! {
            _ = &mut shutdown => break,
            permit = semaphore.clone().acquire_owned() => permit.map_err(|_| WorkerError::Closed)?,
        };

        let task = step();
        tokio::spawn(async move {
            let _permit = permit;
            if let Err(e) = task.await {
                tracing::error!(error = %e, "job failed");
                tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
            }
        });
    }

    info!("waiting for running jobs");
    let _drained = semaphore
        .acquire_many(concurrency)
        .await
        .map_err(|_| WorkerError::Closed)?;
    Ok(())
}

async fn conn(state: &WorkerState) -> Result<Connection> {
    state
        .redis_pool
        .get()
        .await
        .map_err(|e| WorkerError::Pool(e.to_string()))
}

async fn set_status(state: &WorkerState, status: &JobResult) -> Result<()> {
    let json = serde_json::to_string(status)?;
    let mut c = conn(state).await?;
    c.set_ex::<_, _, ()>(
        keys::job_status(&status.job_id),
        &json,
        state.result_ttl_seconds,
    )
    .await
    .map_err(|e| WorkerError::Redis(e.to_string()))
}

async fn process_next_job(state: &WorkerState) -> Result<()> {
    let result: Option<(String, String)> = {
        let mut c = conn(state).await?;
        c.brpop(queues::INGEST_QUEUE, 1.0)
            .await
            .map_err(|e| WorkerError::Redis(e.to_string()))?
    };

    if let Some((_queue, job_json)) = result {
        let job: IngestDocumentJob = serde_json::from_str(&job_json)?;
        run_ingest_job(&state.documents, &job, |status: JobResult| async move {
            set_status(state, &status).await
        })
        .await;
    }
    Ok(())
}

/// Processes one popped job. Status writes are best-effort: once popped, a
/// job always runs and the document records the outcome either way.
async fn run_ingest_job<R, Fut>(
    documents: &DocumentService,
    job: &IngestDocumentJob,
    record: R,
) -> JobResult
where
    R: Fn(JobResult) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    tracing::info!(job_id = %job.job_id, document_id = %job.document_id, "processing ingest");
    if let Err(e) = record(JobResult::processing(job)).await {
        tracing::warn!(job_id = %job.job_id, error = %e, "could not mark job processing");
    }

    let outcome = match documents.process(job.document_id).await {
        Ok(doc) => {
            tracing::info!(job_id = %job.job_id, chunks = doc.chunk_count, "ingest completed");
            JobResult::completed(
                job,
                serde_json::json!({
                    "document_id": doc.id,
                    "status": doc.status,
                    "chunk_count": doc.chunk_count,
                }),
            )
        }
        Err(e) => {
            tracing::warn!(
                job_id = %job.job_id,
                reason = ?e.reason_code(),
                error = %e,
                "ingest failed"
            );
            JobResult::failed(job, &e)
        }
    };

    if let Err(e) = record(outcome.clone()).await {
        tracing::error!(job_id = %job.job_id, error = %e, "could not record job result");
    }
    outcome
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("worker=debug,docsearch=debug");

    let app = AppConfig::load()?;
    let config = &app.config;

    let redis_pool = create_pool(config.redis_url.as_ref())?;
    info!("Redis connected");

    let components =
        Components::connect(&app, redis_pool.clone(), &[config.embedding.model.as_str()]).await?;

    let state = WorkerState {
        redis_pool,
        documents: components.document_service(&app),
        result_ttl_seconds: config.worker.result_ttl_seconds,
    };

    let concurrency = config.worker.concurrency;
    let consumer = JobConsumer::new(state, concurrency);

    info!(concurrency, "worker started");
    consumer
        .start(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutdown requested");
        })
        .await?;

    Ok(())
}
