//! OpenAI provider implementation

use crate::config::provider::ProviderConfig;
use crate::error::{SubconsciousError, SubconsciousResult};
use crate::llm::messages::ChatMessage;
use reqwest::Client;
use serde_json::{json, Value};

/// OpenAI provider handler
pub struct OpenAiProvider {
    config: ProviderConfig,
    http_client: Client,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider
    pub fn new(config: ProviderConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// OpenAI chat completion
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> SubconsciousResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.effective_base_url());

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

        let mut request_body = json!({
            "model": self.config.model,
            "messages": wire_messages,
        });
        if let Some(max_tokens) = self.config.max_tokens {
            request_body["max_tokens"] = json!(max_tokens);
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| SubconsciousError::config("OpenAI provider requires an API key"))?;

        tracing::debug!(model = %self.config.model, "OpenAI chat request");

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| SubconsciousError::llm(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubconsciousError::llm(format!(
                "OpenAI API error (status {}): {}",
                status, error_text
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| SubconsciousError::llm(format!("failed to parse OpenAI response: {}", e)))?;

        response_json
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SubconsciousError::llm("OpenAI response missing message content"))
    }
}
