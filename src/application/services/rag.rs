use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::application::{LayeredSettings, RetryPolicy, TokenizerRegistry};
use crate::domain::{
    assemble_context,
    ports::{EmbeddingService, LlmService, Tokenizer, VectorStore},
    truncate_to_tokens, Answer, DomainError, Embedding, SearchResult, SourceChunk, Stage,
};

/// Prompt text used when answering queries.
#[derive(Debug, Clone)]
pub struct RagPrompts {
    /// Restricts the model to the supplied context.
    pub system: String,
    /// Must contain `{context}` and `{query}`.
    pub user_template: String,
    pub no_results_message: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: "Answer the question using only the numbered context passages. \
                     If the context does not contain the answer, say that you do not know."
                .to_string(),
            user_template: "Context:\n{context}\n\nQuestion: {query}".to_string(),
            no_results_message: "No relevant documents found.".to_string(),
        }
    }
}

pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmService>,
    tokenizers: TokenizerRegistry,
    settings: Arc<LayeredSettings>,
    prompts: RagPrompts,
    retry: RetryPolicy,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmService>,
        tokenizers: TokenizerRegistry,
        settings: Arc<LayeredSettings>,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            llm,
            tokenizers,
            settings,
            prompts: RagPrompts::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_prompts(mut self, prompts: RagPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether `model` can be used for generation, i.e. has a tokenizer.
    pub fn supports_model(&self, model: &str) -> bool {
        self.tokenizers.get(model).is_ok()
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>, DomainError> {
        let settings = self.settings.resolve().await?;
        self.retrieve_top_k(query, settings.top_k).await
    }

    /// Embeds `query` and returns its `top_k` nearest chunks by cosine
    /// similarity. A query vector whose dimension differs from the index is
    /// rejected before the index is touched.
    #[instrument(skip(self))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::validation("query is empty"));
        }
        if top_k == 0 {
            return Err(DomainError::validation("top_k must be positive"));
        }

        let embedding = self.embed_query(query).await?;
        embedding.ensure_dimension(self.vector_store.dimension())?;

        self.retry
            .run(Stage::Search, || self.vector_store.search(&embedding, top_k))
            .await
    }

    async fn embed_query(&self, query: &str) -> Result<Embedding, DomainError> {
        let tokenizer = self.tokenizers.get(self.embedding.model())?;
        let input =
            truncate_to_tokens(tokenizer.as_ref(), query, self.embedding.max_input_tokens())?;
        if input.truncated {
            warn!(tokens = input.tokens, "query truncated to embedding input limit");
        }

        self.retry
            .run(Stage::Embedding, || self.embedding.embed(&input.text))
            .await
    }

    /// Answers `query` from indexed documents.
    ///
    /// An empty search result is a normal answer carrying the configured
    /// no-results message; the model is not called in that case.
    #[instrument(skip(self))]
    pub async fn answer(&self, query: &str) -> Result<Answer, DomainError> {
        let settings = self.settings.resolve().await?;
        let results = self.retrieve_top_k(query, settings.top_k).await?;
        if results.is_empty() {
            info!("no matching chunks");
            return Ok(Answer::no_results(query, &self.prompts.no_results_message));
        }

        let tokenizer = self.tokenizers.get(&settings.llm_model)?;
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.content.as_str()).collect();
        let selection = assemble_context(tokenizer.as_ref(), &texts, settings.context_token_budget)?;
        if selection.pieces.is_empty() {
            let mut answer = Answer::no_results(query, &self.prompts.no_results_message);
            answer.context = selection.report();
            return Ok(answer);
        }

        let context = selection
            .pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| format!("[{}] {}", i + 1, piece.text))
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = self.render_prompt(&context, query);

        self.check_context_window(
            tokenizer.as_ref(),
            &settings.llm_model,
            &prompt,
            settings.max_output_tokens,
        )?;

        let text = self
            .retry
            .run(Stage::Generation, || {
                self.llm.generate(
                    &settings.llm_model,
                    &self.prompts.system,
                    &prompt,
                    settings.max_output_tokens,
                )
            })
            .await?;

        let sources = selection
            .pieces
            .iter()
            .map(|piece| {
                let result = &results[piece.index];
                SourceChunk {
                    chunk_id: result.chunk.id,
                    document_id: result.chunk.document_id,
                    chunk_index: result.chunk.chunk_index,
                    content: piece.text.clone(),
                    score: result.score,
                    truncated: piece.truncated,
                }
            })
            .collect();

        info!(
            sources = selection.pieces.len(),
            context_tokens = selection.used_tokens,
            degraded = selection.is_degraded(),
            "answer generated"
        );

        Ok(Answer {
            query: query.to_string(),
            text,
            sources,
            context: selection.report(),
        })
    }

    fn render_prompt(&self, context: &str, query: &str) -> String {
        self.prompts
            .user_template
            .replace("{context}", context)
            .replace("{query}", query)
    }

    fn check_context_window(
        &self,
        tokenizer: &dyn Tokenizer,
        model: &str,
        prompt: &str,
        max_output_tokens: usize,
    ) -> Result<(), DomainError> {
        let tokens = tokenizer.count_tokens(&self.prompts.system)?
            + tokenizer.count_tokens(prompt)?
            + max_output_tokens;
        let limit = self.llm.context_window(model);
        if tokens > limit {
            return Err(DomainError::InputTooLarge {
                stage: Stage::Generation,
                tokens,
                limit,
            });
        }
        Ok(())
    }
}
