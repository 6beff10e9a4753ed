//! Memory store contract and backends
//!
//! The engine requires CRUD plus three search modes from its storage
//! collaborator. `InMemoryStore` is the reference implementation used by the
//! test suite, `FileStore` adds JSON persistence, and `WeaviateStore` talks
//! to a real vector database.

pub mod file;
pub mod in_memory;
pub mod weaviate;

pub use file::FileStore;
pub use in_memory::InMemoryStore;
pub use weaviate::WeaviateStore;

use crate::memory::types::{MemoryId, MemoryRecord, QueryFilters};
use async_trait::async_trait;
use thiserror::Error;

/// Memory store error
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Storage capability the memory engine is built against
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Create a collection if absent; idempotent
    async fn ensure_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Upsert a record by its id (a fresh id is generated when empty)
    async fn add(&self, collection: &str, record: MemoryRecord) -> Result<MemoryId, StoreError>;

    /// Fetch a record by id
    async fn get(
        &self,
        collection: &str,
        id: &MemoryId,
    ) -> Result<Option<MemoryRecord>, StoreError>;

    /// Delete a record by id; false when absent
    async fn delete(&self, collection: &str, id: &MemoryId) -> Result<bool, StoreError>;

    /// Keyword search; `query` is OR-joined terms
    async fn search_keyword(
        &self,
        collection: &str,
        query: &str,
        filters: &QueryFilters,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError>;

    /// Semantic search over summaries
    async fn search_semantic(
        &self,
        collection: &str,
        query: &str,
        filters: &QueryFilters,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError>;

    /// Combined keyword and semantic search
    async fn search_hybrid(
        &self,
        collection: &str,
        semantic_query: &str,
        keyword_query: &str,
        filters: &QueryFilters,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError>;
}

/// Split an OR-joined keyword query back into lowercase terms.
///
/// The executor joins keywords with " OR "; splitting on that exact
/// separator keeps multi-word keywords intact.
pub(crate) fn keyword_terms(query: &str) -> Vec<String> {
    query
        .split(" OR ")
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

/// Whether a record matches any of the given lowercase terms, by substring
/// against its summary or any of its keywords.
pub(crate) fn keyword_matches(record: &MemoryRecord, terms: &[String]) -> bool {
    let summary = record.summary.to_lowercase();
    terms.iter().any(|term| {
        summary.contains(term)
            || record
                .keywords
                .iter()
                .any(|keyword| keyword.to_lowercase().contains(term))
    })
}

/// Combined importance/recency ranking key used by hybrid search.
///
/// The exact key (`importance * 10000 + seconds since epoch`) is part of the
/// reference behavior and must not change.
pub(crate) fn hybrid_rank_key(record: &MemoryRecord) -> i64 {
    record.importance * 10_000 + record.timestamp_seconds()
}
