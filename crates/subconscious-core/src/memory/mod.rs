//! Memory subsystem: record types, store contract and backends, retrieval
//! planning and execution, and the memory lifecycle.

pub mod engine;
pub mod executor;
pub mod lifecycle;
pub mod planner;
pub mod store;
pub mod types;

pub use engine::{format_memories, SubconsciousEngine};
pub use executor::RetrievalExecutor;
pub use lifecycle::{HeuristicScorer, ImportanceScorer, LifecycleManager, merge_records};
pub use planner::QueryPlanner;
pub use store::{FileStore, InMemoryStore, MemoryStore, StoreError, WeaviateStore};
pub use types::{
    MemoryId, MemoryRecord, QueryFilters, RetrievalQuery, SearchType, collection_name,
};
