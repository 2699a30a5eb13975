use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, ReasonCode};

pub mod queues {
    pub const INGEST_QUEUE: &str = "jobs:ingest";
}

pub mod keys {
    use uuid::Uuid;

    pub fn job_status(job_id: &Uuid) -> String {
        format!("job:status:{}", job_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueJobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: Uuid,
    pub document_id: Uuid,
    pub status: QueueJobStatus,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub reason: Option<ReasonCode>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobResult {
    fn with_status(job: &IngestDocumentJob, status: QueueJobStatus) -> Self {
        Self {
            job_id: job.job_id,
            document_id: job.document_id,
            status,
            result: None,
            error: None,
            reason: None,
            completed_at: None,
        }
    }

    pub fn pending(job: &IngestDocumentJob) -> Self {
        Self::with_status(job, QueueJobStatus::Pending)
    }

    pub fn processing(job: &IngestDocumentJob) -> Self {
        Self::with_status(job, QueueJobStatus::Processing)
    }

    pub fn completed(job: &IngestDocumentJob, result: serde_json::Value) -> Self {
        Self {
            result: Some(result),
            completed_at: Some(Utc::now()),
            ..Self::with_status(job, QueueJobStatus::Completed)
        }
    }

    pub fn failed(job: &IngestDocumentJob, error: &DomainError) -> Self {
        Self {
            error: Some(error.to_string()),
            reason: Some(error.reason_code()),
            completed_at: Some(Utc::now()),
            ..Self::with_status(job, QueueJobStatus::Failed)
        }
    }
}

/// Runs the chunk, embed and index pipeline for one stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestDocumentJob {
    pub job_id: Uuid,
    pub document_id: Uuid,
}

impl IngestDocumentJob {
    pub fn new(document_id: Uuid) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            document_id,
        }
    }
}
