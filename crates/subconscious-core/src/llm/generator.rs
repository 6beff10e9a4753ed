//! The text-generation capability contract

use crate::error::SubconsciousResult;
use async_trait::async_trait;

/// Opaque text-generation capability: given a prompt and an optional system
/// instruction, produce text. Single-shot request/response, no streaming at
/// this layer.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt` under `system_prompt`
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> SubconsciousResult<String>;
}
