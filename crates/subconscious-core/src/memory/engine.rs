//! Engine facade
//!
//! One engine per agent, wiring the planner, executor, and lifecycle manager
//! over a shared store and text generator. `recall` surfaces relevant
//! memories for the current turn; `remember` authors a new one. Within a
//! single agent's turn the two run sequentially; separate agents can run
//! their engines concurrently over the same store.

use crate::config::EngineConfig;
use crate::error::SubconsciousResult;
use crate::llm::generator::TextGenerator;
use crate::llm::session::ChatSession;
use crate::memory::executor::RetrievalExecutor;
use crate::memory::lifecycle::LifecycleManager;
use crate::memory::planner::QueryPlanner;
use crate::memory::store::MemoryStore;
use crate::memory::types::{collection_name, MemoryRecord};
use std::sync::Arc;

/// Per-agent memory engine
pub struct SubconsciousEngine {
    agent_name: String,
    collection: String,
    store: Arc<dyn MemoryStore>,
    planner: QueryPlanner,
    executor: RetrievalExecutor,
    lifecycle: LifecycleManager,
    planning_window: usize,
    authoring_window: usize,
}

impl SubconsciousEngine {
    /// Build an engine for `agent_name` over the given store and generator
    pub fn new(
        agent_name: impl Into<String>,
        store: Arc<dyn MemoryStore>,
        llm: Arc<dyn TextGenerator>,
        config: EngineConfig,
    ) -> Self {
        let agent_name = agent_name.into();
        let planner = QueryPlanner::new(llm.clone(), &agent_name, config.retrieval.max_queries);
        let executor = RetrievalExecutor::new(store.clone(), config.retrieval.clone());
        let lifecycle = LifecycleManager::new(
            llm,
            store.clone(),
            &agent_name,
            config.categories.clone(),
        );

        Self {
            collection: collection_name(&agent_name),
            agent_name,
            store,
            planner,
            executor,
            lifecycle,
            planning_window: config.planning_window,
            authoring_window: config.authoring_window,
        }
    }

    /// The agent this engine serves
    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    /// The store collection backing this agent's memories
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Retrieve memories relevant to the session's recent turns.
    ///
    /// An empty session retrieves nothing without touching the generator;
    /// planning and per-query faults degrade to fewer (or zero) results.
    pub async fn recall(&self, session: &ChatSession, location: &str) -> Vec<MemoryRecord> {
        if session.is_empty() {
            return Vec::new();
        }

        let window = session.recent(self.planning_window);
        let queries = self.planner.plan(window, location).await;
        if queries.is_empty() {
            return Vec::new();
        }

        let records = self.executor.retrieve(&self.collection, &queries).await;
        tracing::debug!(
            agent = %self.agent_name,
            queries = queries.len(),
            records = records.len(),
            "recall cycle complete"
        );
        records
    }

    /// Author and persist a memory from the session's recent turns.
    ///
    /// Ensures the agent's collection exists first; collection-creation and
    /// write failures propagate.
    pub async fn remember(
        &self,
        session: &ChatSession,
        location: &str,
    ) -> SubconsciousResult<Option<MemoryRecord>> {
        if session.is_empty() {
            return Ok(None);
        }

        self.store.ensure_collection(&self.collection).await?;
        let window = session.recent(self.authoring_window);
        self.lifecycle
            .create_from_conversation(&self.collection, window, location)
            .await
    }
}

/// Render retrieved records as the block injected into an agent's prompt
pub fn format_memories(records: &[MemoryRecord]) -> String {
    records
        .iter()
        .map(MemoryRecord::to_prompt_block)
        .collect::<Vec<_>>()
        .join("\n")
}
