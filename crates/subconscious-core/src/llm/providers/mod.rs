//! Provider implementations
//!
//! Each provider exposes one non-streaming chat call. Structural differences
//! between vendors stay inside this module; everything above it sees only
//! `TextGenerator`.

pub mod anthropic;
pub mod ollama;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
