//! Text-generation provider configuration

use crate::llm::provider_types::LlmProvider;
use serde::{Deserialize, Serialize};

/// Configuration for the text-generation provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Which provider to use
    pub provider: LlmProvider,
    /// Model name/ID
    pub model: String,
    /// API endpoint base URL (overrides the provider default)
    pub base_url: Option<String>,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum tokens to generate (providers that require it fall back to a
    /// fixed budget when unset)
    pub max_tokens: Option<u32>,
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            model: "llama3".to_string(),
            base_url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_tokens: None,
        }
    }
}

impl ProviderConfig {
    /// Create a config for a provider and model
    pub fn new(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Effective base URL, falling back to the provider default
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_base_url_default() {
        let config = ProviderConfig::new(LlmProvider::Ollama, "llama3");
        assert_eq!(config.effective_base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_effective_base_url_override() {
        let config = ProviderConfig::new(LlmProvider::OpenAI, "gpt-4o")
            .with_base_url("https://proxy.internal");
        assert_eq!(config.effective_base_url(), "https://proxy.internal");
    }
}
