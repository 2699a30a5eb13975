pub mod bootstrap;
pub mod config;
pub mod embedding;
pub mod llm;
pub mod queue;
pub mod store;
pub mod telemetry;
pub mod tokenizer;
pub mod vector_store;

pub use bootstrap::Components;
pub use config::{AppConfig, Config, PromptsConfig};
pub use embedding::TextEmbedding;
pub use llm::AnthropicLlm;
pub use queue::{keys, queues, IngestDocumentJob, JobResult, QueueJobStatus};
pub use store::{
    InMemoryDocumentStore, InMemorySettingsStore, RedisDocumentStore, RedisSettingsStore,
};
pub use telemetry::init_tracing;
pub use tokenizer::{load_registry, HfTokenizer};
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
