//! Dispatching LLM client
//!
//! One client per configured provider; the engine only ever sees the
//! `TextGenerator` trait.

use crate::config::provider::ProviderConfig;
use crate::error::{SubconsciousError, SubconsciousResult};
use crate::llm::generator::TextGenerator;
use crate::llm::messages::ChatMessage;
use crate::llm::provider_types::LlmProvider;
use crate::llm::providers::{AnthropicProvider, OllamaProvider, OpenAiProvider};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

enum ProviderInstance {
    Ollama(OllamaProvider),
    OpenAi(OpenAiProvider),
    Anthropic(AnthropicProvider),
}

/// LLM client for a single configured provider
pub struct LlmClient {
    provider: LlmProvider,
    instance: ProviderInstance,
}

impl LlmClient {
    /// Create a client from provider configuration
    pub fn new(config: ProviderConfig) -> SubconsciousResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SubconsciousError::config(format!("HTTP client build failed: {}", e)))?;

        let provider = config.provider.clone();
        let instance = match provider {
            LlmProvider::Ollama => {
                ProviderInstance::Ollama(OllamaProvider::new(config, http_client))
            }
            LlmProvider::OpenAI => {
                ProviderInstance::OpenAi(OpenAiProvider::new(config, http_client))
            }
            LlmProvider::Anthropic => {
                ProviderInstance::Anthropic(AnthropicProvider::new(config, http_client))
            }
        };

        Ok(Self { provider, instance })
    }

    /// The configured provider
    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    /// Send a chat request to the configured provider
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> SubconsciousResult<String> {
        match &self.instance {
            ProviderInstance::Ollama(p) => p.chat(messages, system_prompt).await,
            ProviderInstance::OpenAi(p) => p.chat(messages, system_prompt).await,
            ProviderInstance::Anthropic(p) => p.chat(messages, system_prompt).await,
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> SubconsciousResult<String> {
        let messages = [ChatMessage::user(prompt)];
        self.chat(&messages, system_prompt).await
    }
}
