//! Subconscious Memory Engine
//!
//! This crate turns raw conversation history into durable, retrievable memory
//! records and later reconstructs a relevant subset of those records for
//! injection into a future turn. It provides the structured-text extraction
//! contract, the multi-query retrieval planner and executor, the memory
//! lifecycle operations (creation, importance scoring, consolidation), and
//! the memory store contract with in-memory, file-backed, and Weaviate
//! implementations.

pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod memory;
pub mod prompts;

// Re-export commonly used types
pub use config::{EngineConfig, MemoryCategories, ProviderConfig, RetrievalLimits};
pub use error::{SubconsciousError, SubconsciousResult};
pub use llm::{ChatMessage, ChatSession, LlmClient, LlmProvider, MessageRole, TextGenerator};
pub use memory::{
    InMemoryStore, LifecycleManager, MemoryId, MemoryRecord, MemoryStore, QueryFilters,
    QueryPlanner, RetrievalExecutor, RetrievalQuery, SearchType, StoreError, SubconsciousEngine,
    collection_name, merge_records,
};
