//! Builds the production adapters and services from [`AppConfig`].

use std::sync::Arc;
use std::time::Duration;

use deadpool_redis::Pool;
use tracing::info;

use crate::application::{DocumentService, LayeredSettings, RagService, TokenizerRegistry};
use crate::domain::{
    ports::{EmbeddingService, SettingsStore, VectorStore},
    DomainError,
};
use crate::infrastructure::{
    load_registry, AnthropicLlm, AppConfig, QdrantVectorStore, RedisDocumentStore,
    RedisSettingsStore, TextEmbedding,
};

/// Adapters shared by the API server and the worker.
pub struct Components {
    pub embedding: Arc<dyn EmbeddingService>,
    pub vector_store: Arc<dyn VectorStore>,
    pub tokenizers: TokenizerRegistry,
    pub settings_store: Arc<dyn SettingsStore>,
    pub settings: Arc<LayeredSettings>,
    pool: Pool,
}

impl Components {
    /// Connects to Qdrant and loads tokenizers. Every model in
    /// `required_models` must have a tokenizer configured.
    pub async fn connect(
        app: &AppConfig,
        pool: Pool,
        required_models: &[&str],
    ) -> Result<Self, DomainError> {
        let config = &app.config;

        let embedding = TextEmbedding::from_config(&config.embedding);
        let vector_store = QdrantVectorStore::new(
            &config.vector_store.url,
            &config.vector_store.collection,
            config.embedding.dimension,
        )
        .await?;
        info!(
            url = %config.vector_store.url,
            collection = %config.vector_store.collection,
            "vector store connected"
        );

        let tokenizers = load_registry(&config.tokenizers, required_models)?;

        let settings_store: Arc<dyn SettingsStore> =
            Arc::new(RedisSettingsStore::new(pool.clone()));
        let settings = Arc::new(LayeredSettings::new(
            settings_store.clone(),
            config.setting_defaults(),
        ));

        Ok(Self {
            embedding: Arc::new(embedding),
            vector_store: Arc::new(vector_store),
            tokenizers,
            settings_store,
            settings,
            pool,
        })
    }

    pub fn document_service(&self, app: &AppConfig) -> DocumentService {
        let config = &app.config;
        DocumentService::new(
            Arc::new(RedisDocumentStore::new(self.pool.clone())),
            self.embedding.clone(),
            self.vector_store.clone(),
            self.tokenizers.clone(),
            self.settings.clone(),
        )
        .with_retry_policy(
            config
                .retry_policy()
                .with_call_timeout(Duration::from_secs(config.embedding.timeout_seconds)),
        )
        .with_embedding_concurrency(config.rag.embedding_concurrency)
        .with_stale_after(
            i64::try_from(config.worker.stale_processing_seconds)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .unwrap_or(chrono::Duration::MAX),
        )
    }

    /// Reads `ANTHROPIC_API_KEY` from the environment.
    pub fn rag_service(&self, app: &AppConfig) -> RagService {
        let config = &app.config;
        RagService::new(
            self.embedding.clone(),
            self.vector_store.clone(),
            Arc::new(AnthropicLlm::from_config(&config.llm)),
            self.tokenizers.clone(),
            self.settings.clone(),
        )
        .with_prompts(app.rag_prompts())
        .with_retry_policy(
            config
                .retry_policy()
                .with_call_timeout(Duration::from_secs(config.llm.timeout_seconds)),
        )
    }
}
