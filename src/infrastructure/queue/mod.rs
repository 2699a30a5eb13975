mod jobs;

pub use jobs::{keys, queues, IngestDocumentJob, JobResult, QueueJobStatus};
