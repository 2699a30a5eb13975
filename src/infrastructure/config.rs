use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::application::{RagPrompts, RetryPolicy};
use crate::domain::{setting_keys as keys, DomainError};

/// Everything the binaries need, read from `config.yaml` and `prompts.yaml`.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Loads both files from `CONFIG_DIR` (default `config/`). A missing file
    /// falls back to built-in defaults; a malformed one is an error.
    pub fn load() -> Result<Self, DomainError> {
        let dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into());
        Self::load_from(dir)
    }

    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let dir = dir.as_ref();
        let mut config: Config = read_yaml(&dir.join("config.yaml"))?;
        let prompts: PromptsConfig = read_yaml(&dir.join("prompts.yaml"))?;

        config.apply_env_overrides();
        let app = Self { config, prompts };
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let c = &self.config;
        if c.llm.model.trim().is_empty() {
            return Err(DomainError::configuration("llm.model is required"));
        }
        if c.embedding.model.trim().is_empty() {
            return Err(DomainError::configuration("embedding.model is required"));
        }
        if c.embedding.dimension == 0 {
            return Err(DomainError::configuration("embedding.dimension must be positive"));
        }
        if c.rag.chunk_overlap >= c.rag.chunk_size {
            return Err(DomainError::configuration(format!(
                "rag.chunk_overlap ({}) must be smaller than rag.chunk_size ({})",
                c.rag.chunk_overlap, c.rag.chunk_size
            )));
        }
        for placeholder in ["{context}", "{query}"] {
            if !self.prompts.rag.user_template.contains(placeholder) {
                return Err(DomainError::configuration(format!(
                    "prompts.rag.user_template must contain {placeholder}"
                )));
            }
        }
        Ok(())
    }

    pub fn rag_prompts(&self) -> RagPrompts {
        RagPrompts {
            system: self.prompts.rag.system.clone(),
            user_template: self.prompts.rag.user_template.clone(),
            no_results_message: self.prompts.rag.no_results_message.clone(),
        }
    }
}

fn read_yaml<T>(path: &Path) -> Result<T, DomainError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match std::fs::read_to_string(path) {
        Ok(raw) => {
            info!(path = %path.display(), "loaded configuration file");
            serde_yaml::from_str(&raw).map_err(|e| {
                DomainError::configuration(format!("{}: {e}", path.display()))
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "configuration file missing, using defaults");
            Ok(T::default())
        }
        Err(e) => Err(DomainError::configuration(format!("{}: {e}", path.display()))),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub tokenizers: TokenizersConfig,
    pub rag: RagConfig,
    pub retry: RetryConfig,
    pub vector_store: VectorStoreConfig,
    pub redis_url: RedisUrl,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub worker: WorkerConfig,
}

impl Config {
    /// Connection endpoints may come from the environment, as in a
    /// container deployment.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("REDIS_URL") {
            self.redis_url = RedisUrl(url);
        }
        if let Ok(url) = std::env::var("QDRANT_URL") {
            self.vector_store.url = url;
        }
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(n) = std::env::var("WORKER_CONCURRENCY")
            .ok()
            .and_then(|n| n.parse().ok())
        {
            self.worker.concurrency = n;
        }
    }

    /// Bottom layer of the settings lookup.
    pub fn setting_defaults(&self) -> HashMap<String, String> {
        [
            (keys::LLM_MODEL, self.llm.model.clone()),
            (keys::CHUNK_SIZE, self.rag.chunk_size.to_string()),
            (keys::CHUNK_OVERLAP, self.rag.chunk_overlap.to_string()),
            (keys::TOP_K, self.rag.top_k.to_string()),
            (
                keys::CONTEXT_TOKEN_BUDGET,
                self.rag.context_token_budget.to_string(),
            ),
            (
                keys::MAX_OUTPUT_TOKENS,
                self.rag.max_output_tokens.to_string(),
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.initial_backoff_ms),
            Duration::from_millis(self.retry.max_backoff_ms),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub context_window: usize,
    /// Per-model overrides of `context_window`.
    pub context_windows: HashMap<String, usize>,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet-latest".to_string(),
            context_window: 200_000,
            context_windows: HashMap::new(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    pub max_input_tokens: usize,
    pub timeout_seconds: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            max_input_tokens: 8191,
            timeout_seconds: 30,
        }
    }
}

/// Model id to `tokenizer.json` path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct TokenizersConfig(pub HashMap<String, PathBuf>);

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub context_token_budget: usize,
    pub max_output_tokens: usize,
    pub embedding_concurrency: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            context_token_budget: 6000,
            max_output_tokens: 1024,
            embedding_concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub url: String,
    pub collection: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection: "documents".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct RedisUrl(pub String);

impl Default for RedisUrl {
    fn default() -> Self {
        Self("redis://localhost:6379".to_string())
    }
}

impl AsRef<str> for RedisUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub concurrency: usize,
    pub result_ttl_seconds: u64,
    /// Documents left in `processing` longer than this may be processed again.
    pub stale_processing_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            result_ttl_seconds: 3600,
            stale_processing_seconds: 900,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub rag: RagPromptsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagPromptsConfig {
    pub system: String,
    pub user_template: String,
    pub no_results_message: String,
}

impl Default for RagPromptsConfig {
    fn default() -> Self {
        let prompts = RagPrompts::default();
        Self {
            system: prompts.system,
            user_template: prompts.user_template,
            no_results_message: prompts.no_results_message,
        }
    }
}
