//! Ollama provider implementation

use crate::config::provider::ProviderConfig;
use crate::error::{SubconsciousError, SubconsciousResult};
use crate::llm::messages::ChatMessage;
use reqwest::Client;
use serde_json::{json, Value};

/// Ollama provider handler
pub struct OllamaProvider {
    config: ProviderConfig,
    http_client: Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    pub fn new(config: ProviderConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Ollama chat completion
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> SubconsciousResult<String> {
        let url = format!("{}/api/chat", self.config.effective_base_url());

        let mut wire_messages: Vec<Value> = Vec::new();
        if let Some(system) = system_prompt {
            wire_messages.push(json!({"role": "system", "content": system}));
        }
        for message in messages {
            wire_messages.push(json!({
                "role": message.role.to_string(),
                "content": message.content,
            }));
        }

        let request_body = json!({
            "model": self.config.model,
            "messages": wire_messages,
            "stream": false,
        });

        tracing::debug!(model = %self.config.model, "Ollama chat request");

        let response = self
            .http_client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| SubconsciousError::llm(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubconsciousError::llm(format!(
                "Ollama API error (status {}): {}",
                status, error_text
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| SubconsciousError::llm(format!("failed to parse Ollama response: {}", e)))?;

        response_json
            .pointer("/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SubconsciousError::llm("Ollama response missing message content"))
    }
}
