//! Layered lookup of pipeline settings.
//!
//! Layers are consulted in order and the first one holding a key wins. The
//! standard stack is: settings store, then process environment, then the
//! defaults from the configuration file.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{
    ports::SettingsStore, setting_keys as keys, ChunkingConfig, DomainError,
};

#[async_trait]
pub trait SettingsLayer: Send + Sync {
    fn name(&self) -> &'static str;
    async fn lookup(&self, key: &str) -> Result<Option<String>, DomainError>;
}

pub struct StoreLayer {
    store: Arc<dyn SettingsStore>,
}

impl StoreLayer {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsLayer for StoreLayer {
    fn name(&self) -> &'static str {
        "store"
    }

    async fn lookup(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.store.get_setting(key).await?.map(|s| s.value))
    }
}

/// Reads `KEY` (the upper-cased setting key) from the environment.
pub enum EnvLayer {
    Process,
    Fixed(HashMap<String, String>),
}

impl EnvLayer {
    pub fn var_name(key: &str) -> String {
        key.to_uppercase()
    }
}

#[async_trait]
impl SettingsLayer for EnvLayer {
    fn name(&self) -> &'static str {
        "environment"
    }

    async fn lookup(&self, key: &str) -> Result<Option<String>, DomainError> {
        let var = Self::var_name(key);
        Ok(match self {
            Self::Process => std::env::var(&var).ok(),
            Self::Fixed(vars) => vars.get(&var).cloned(),
        })
    }
}

pub struct DefaultsLayer {
    values: HashMap<String, String>,
}

impl DefaultsLayer {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

#[async_trait]
impl SettingsLayer for DefaultsLayer {
    fn name(&self) -> &'static str {
        "defaults"
    }

    async fn lookup(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Settings read fresh for every ingestion or query.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub llm_model: String,
    pub chunking: ChunkingConfig,
    pub top_k: usize,
    pub context_token_budget: usize,
    pub max_output_tokens: usize,
}

pub struct LayeredSettings {
    layers: Vec<Box<dyn SettingsLayer>>,
}

impl LayeredSettings {
    pub fn new(store: Arc<dyn SettingsStore>, defaults: HashMap<String, String>) -> Self {
        Self::with_layers(vec![
            Box::new(StoreLayer::new(store)),
            Box::new(EnvLayer::Process),
            Box::new(DefaultsLayer::new(defaults)),
        ])
    }

    pub fn with_layers(layers: Vec<Box<dyn SettingsLayer>>) -> Self {
        Self { layers }
    }

    /// First value found for `key` and the name of the layer it came from.
    pub async fn get(&self, key: &str) -> Result<Option<(String, &'static str)>, DomainError> {
        for layer in &self.layers {
            if let Some(value) = layer.lookup(key).await? {
                let value = value.trim().to_string();
                if !value.is_empty() {
                    return Ok(Some((value, layer.name())));
                }
            }
        }
        Ok(None)
    }

    async fn required<T>(&self, key: &str) -> Result<T, DomainError>
    where
        T: FromStr,
    {
        let (raw, source) = self
            .get(key)
            .await?
            .ok_or_else(|| DomainError::configuration(format!("missing setting `{key}`")))?;

        debug!(key, source, "setting resolved");
        raw.parse().map_err(|_| {
            DomainError::configuration(format!("invalid value `{raw}` for `{key}` from {source}"))
        })
    }

    async fn positive(&self, key: &str) -> Result<usize, DomainError> {
        let value: usize = self.required(key).await?;
        if value == 0 {
            return Err(DomainError::configuration(format!("`{key}` must be positive")));
        }
        Ok(value)
    }

    pub async fn resolve(&self) -> Result<PipelineSettings, DomainError> {
        let llm_model: String = self.required(keys::LLM_MODEL).await?;
        let chunk_size = self.positive(keys::CHUNK_SIZE).await?;
        let overlap: usize = self.required(keys::CHUNK_OVERLAP).await?;

        Ok(PipelineSettings {
            llm_model,
            chunking: ChunkingConfig::new(chunk_size, overlap)?,
            top_k: self.positive(keys::TOP_K).await?,
            context_token_budget: self.positive(keys::CONTEXT_TOKEN_BUDGET).await?,
            max_output_tokens: self.positive(keys::MAX_OUTPUT_TOKENS).await?,
        })
    }
}
