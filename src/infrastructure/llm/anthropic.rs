use std::collections::HashMap;

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::anthropic;

use crate::domain::{ports::LlmService, DomainError, Stage};
use crate::infrastructure::config::LlmConfig;

/// Claude through rig. The API key comes from `ANTHROPIC_API_KEY`.
pub struct AnthropicLlm {
    client: anthropic::Client,
    default_context_window: usize,
    context_windows: HashMap<String, usize>,
}

impl AnthropicLlm {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: anthropic::Client::from_env(),
            default_context_window: config.context_window,
            context_windows: config.context_windows.clone(),
        }
    }
}

#[async_trait]
impl LlmService for AnthropicLlm {
    async fn generate(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        max_output_tokens: usize,
    ) -> Result<String, DomainError> {
        let agent = self
            .client
            .agent(model)
            .preamble(system)
            .max_tokens(max_output_tokens as u64)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| DomainError::external(Stage::Generation, e.to_string()))
    }

    fn context_window(&self, model: &str) -> usize {
        self.context_windows
            .get(model)
            .copied()
            .unwrap_or(self.default_context_window)
    }
}
