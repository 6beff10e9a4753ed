//! Text-generation capability: message types, per-agent sessions, and
//! provider implementations behind a single `generate` interface.

pub mod client;
pub mod generator;
pub mod messages;
pub mod provider_types;
pub mod providers;
pub mod session;

pub use client::LlmClient;
pub use generator::TextGenerator;
pub use messages::{ChatMessage, MessageRole};
pub use provider_types::LlmProvider;
pub use session::ChatSession;
