//! Deterministic stand-ins for the capability ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use uuid::Uuid;

use crate::application::settings::{DefaultsLayer, EnvLayer, StoreLayer};
use crate::application::{LayeredSettings, RetryPolicy, TokenizerRegistry};
use crate::domain::{
    ports::{EmbeddingService, LlmService, SettingsStore, Tokenizer, VectorStore},
    setting_keys as keys, DomainError, Embedding, IndexedChunk, SearchResult, Stage,
};
use crate::infrastructure::{InMemorySettingsStore, InMemoryVectorStore};

pub const DIMENSION: usize = 32;
pub const EMBEDDING_MODEL: &str = "test-embedding";
pub const LLM_MODEL: &str = "test-llm";

/// One token per char; ids are code points.
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, DomainError> {
        Ok(text.chars().map(u32::from).collect())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, DomainError> {
        ids.iter()
            .map(|&id| {
                char::from_u32(id).ok_or_else(|| DomainError::internal(format!("bad id {id}")))
            })
            .collect()
    }
}

/// One token per whitespace-separated word, ids handed out on first sight.
#[derive(Default)]
pub struct WordTokenizer {
    vocab: Mutex<Vec<String>>,
}

impl Tokenizer for WordTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, DomainError> {
        let mut vocab = self.vocab.lock().unwrap();
        Ok(text
            .split_whitespace()
            .map(|word| match vocab.iter().position(|w| w == word) {
                Some(id) => id as u32,
                None => {
                    vocab.push(word.to_string());
                    (vocab.len() - 1) as u32
                }
            })
            .collect())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, DomainError> {
        let vocab = self.vocab.lock().unwrap();
        let words = ids
            .iter()
            .map(|&id| {
                vocab
                    .get(id as usize)
                    .cloned()
                    .ok_or_else(|| DomainError::internal(format!("unknown id {id}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(words.join(" "))
    }
}

/// Character-histogram embeddings: similar strings get similar vectors.
pub struct FakeEmbedding {
    dimension: usize,
    transient_marker: Option<String>,
    permanent_marker: Option<String>,
    calls: AtomicUsize,
}

impl FakeEmbedding {
    pub fn new() -> Self {
        Self::with_dimension(DIMENSION)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            transient_marker: None,
            permanent_marker: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_transient_on(mut self, marker: &str) -> Self {
        self.transient_marker = Some(marker.to_string());
        self
    }

    pub fn fail_permanent_on(mut self, marker: &str) -> Self {
        self.permanent_marker = Some(marker.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingService for FakeEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(marker) = &self.transient_marker {
            if text.contains(marker.as_str()) {
                return Err(DomainError::transient(Stage::Embedding, "503 overloaded"));
            }
        }
        if let Some(marker) = &self.permanent_marker {
            if text.contains(marker.as_str()) {
                return Err(DomainError::permanent(Stage::Embedding, "400 bad request"));
            }
        }

        let mut vector = vec![0.0; self.dimension];
        for c in text.chars() {
            vector[c as usize % self.dimension] += 1.0;
        }
        Ok(Embedding::new(vector))
    }

    fn model(&self) -> &str {
        EMBEDDING_MODEL
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn max_input_tokens(&self) -> usize {
        8191
    }
}

#[derive(Debug, Clone)]
pub struct LlmCall {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub max_output_tokens: usize,
}

pub struct FakeLlm {
    reply: String,
    calls: Mutex<Vec<LlmCall>>,
}

impl FakeLlm {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn last_call(&self) -> Option<LlmCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmService for FakeLlm {
    async fn generate(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        max_output_tokens: usize,
    ) -> Result<String, DomainError> {
        self.calls.lock().unwrap().push(LlmCall {
            model: model.to_string(),
            system: system.to_string(),
            prompt: prompt.to_string(),
            max_output_tokens,
        });
        Ok(self.reply.clone())
    }

    fn context_window(&self, _model: &str) -> usize {
        100_000
    }
}

/// Counts searches and upserts so tests can assert what reached the index.
pub struct CountingVectorStore {
    inner: InMemoryVectorStore,
    searches: AtomicUsize,
    upserts: AtomicUsize,
}

impl CountingVectorStore {
    pub fn new(inner: InMemoryVectorStore) -> Self {
        Self {
            inner,
            searches: AtomicUsize::new(0),
            upserts: AtomicUsize::new(0),
        }
    }

    pub fn search_calls(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn upsert_calls(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn count_for(&self, document_id: Uuid) -> usize {
        self.inner.count_for(document_id)
    }
}

#[async_trait]
impl VectorStore for CountingVectorStore {
    async fn upsert(&self, document_id: Uuid, chunks: &[IndexedChunk]) -> Result<(), DomainError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(document_id, chunks).await
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search(query, top_k).await
    }

    async fn delete_by_document(&self, document_id: Uuid) -> Result<(), DomainError> {
        self.inner.delete_by_document(document_id).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

pub fn tokenizers() -> TokenizerRegistry {
    TokenizerRegistry::new()
        .register(EMBEDDING_MODEL, Arc::new(CharTokenizer))
        .register(LLM_MODEL, Arc::new(CharTokenizer))
}

pub fn setting_defaults() -> HashMap<String, String> {
    [
        (keys::LLM_MODEL, LLM_MODEL),
        (keys::CHUNK_SIZE, "1000"),
        (keys::CHUNK_OVERLAP, "200"),
        (keys::TOP_K, "5"),
        (keys::CONTEXT_TOKEN_BUDGET, "6000"),
        (keys::MAX_OUTPUT_TOKENS, "1024"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Store, then the given fake environment, then test defaults.
pub fn settings_with_store(store: Arc<dyn SettingsStore>, env: &[(&str, &str)]) -> LayeredSettings {
    let env = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    LayeredSettings::with_layers(vec![
        Box::new(StoreLayer::new(store)),
        Box::new(EnvLayer::Fixed(env)),
        Box::new(DefaultsLayer::new(setting_defaults())),
    ])
}

pub fn settings(env: &[(&str, &str)]) -> LayeredSettings {
    settings_with_store(Arc::new(InMemorySettingsStore::new()), env)
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(2))
        .with_call_timeout(Duration::from_secs(5))
}

/// One tracing event with its fields rendered through `Debug`.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub target: String,
    pub level: tracing::Level,
    pub fields: HashMap<String, String>,
}

struct FieldRecorder<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldRecorder<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

#[derive(Clone, Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: tracing::Subscriber> Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut FieldRecorder(&mut fields));
        self.events.lock().unwrap().push(CapturedEvent {
            target: event.metadata().target().to_string(),
            level: *event.metadata().level(),
            fields,
        });
    }
}

/// Runs `f` with a subscriber that records every event on this thread.
pub fn capture_events<T>(f: impl FnOnce() -> T) -> (T, Vec<CapturedEvent>) {
    let capture = EventCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    let events = capture.events.lock().unwrap().clone();
    (out, events)
}
