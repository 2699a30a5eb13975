mod document_store;
mod embedding;
mod job_queue;
mod llm;
mod settings_store;
mod tokenizer;
mod vector_store;

pub use document_store::DocumentStore;
pub use embedding::EmbeddingService;
pub use job_queue::JobQueue;
pub use llm::LlmService;
pub use settings_store::SettingsStore;
pub use tokenizer::Tokenizer;
pub use vector_store::VectorStore;
