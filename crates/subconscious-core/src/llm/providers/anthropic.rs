//! Anthropic provider implementation

use crate::config::provider::ProviderConfig;
use crate::error::{SubconsciousError, SubconsciousResult};
use crate::llm::messages::{ChatMessage, MessageRole};
use reqwest::Client;
use serde_json::{json, Value};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic provider handler
pub struct AnthropicProvider {
    config: ProviderConfig,
    http_client: Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(config: ProviderConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Anthropic messages completion
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> SubconsciousResult<String> {
        let url = format!("{}/v1/messages", self.config.effective_base_url());

        // Anthropic takes the system prompt as a top-level field, not a
        // system-role message.
        let wire_messages: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| {
                json!({
                    "role": m.role.to_string(),
                    "content": m.content,
                })
            })
            .collect();

        let mut request_body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": wire_messages,
        });
        if let Some(system) = system_prompt {
            request_body["system"] = json!(system);
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| SubconsciousError::config("Anthropic provider requires an API key"))?;

        tracing::debug!(model = %self.config.model, "Anthropic chat request");

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| SubconsciousError::llm(format!("Anthropic request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubconsciousError::llm(format!(
                "Anthropic API error (status {}): {}",
                status, error_text
            )));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            SubconsciousError::llm(format!("failed to parse Anthropic response: {}", e))
        })?;

        response_json
            .pointer("/content/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SubconsciousError::llm("Anthropic response missing text content"))
    }
}
