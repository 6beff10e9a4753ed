//! Retrieval executor
//!
//! Runs each planned query against the store with its effective strategy,
//! then merges, deduplicates, ranks, and truncates the results. A failed
//! sub-query contributes zero hits; retrieval never fails the caller's turn.

use crate::config::RetrievalLimits;
use crate::memory::store::MemoryStore;
use crate::memory::types::{MemoryRecord, RetrievalQuery, SearchType};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

/// Executes planned queries against a memory store
pub struct RetrievalExecutor {
    store: Arc<dyn MemoryStore>,
    limits: RetrievalLimits,
}

impl RetrievalExecutor {
    /// Create an executor over `store` with the given bounds
    pub fn new(store: Arc<dyn MemoryStore>, limits: RetrievalLimits) -> Self {
        Self { store, limits }
    }

    /// Execute the query list and return a capped, deduplicated, ranked
    /// record list.
    ///
    /// Queries run concurrently, but results are collected in planning order
    /// before deduplication so that "first occurrence wins" means first in
    /// the plan, not first to complete.
    pub async fn retrieve(
        &self,
        collection: &str,
        queries: &[RetrievalQuery],
    ) -> Vec<MemoryRecord> {
        let futures = queries
            .iter()
            .take(self.limits.max_queries)
            .map(|query| self.run_query(collection, query));
        let per_query: Vec<Vec<MemoryRecord>> = join_all(futures).await;

        let mut seen: HashSet<String> = HashSet::new();
        let mut unique: Vec<MemoryRecord> = Vec::new();
        for record in per_query.into_iter().flatten() {
            if seen.insert(record.id.as_str().to_string()) {
                unique.push(record);
            }
        }

        // Importance first; recency is the documented tiebreak.
        unique.sort_by(|a, b| {
            b.importance
                .cmp(&a.importance)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        unique.truncate(self.limits.max_results);
        unique
    }

    async fn run_query(&self, collection: &str, query: &RetrievalQuery) -> Vec<MemoryRecord> {
        let limit = self.limits.hits_per_query;

        let result = match query.search_type {
            SearchType::Keyword => {
                if !query.has_keywords() {
                    return Vec::new();
                }
                self.store
                    .search_keyword(collection, &query.keyword_query(), &query.filters, limit)
                    .await
            }
            SearchType::Semantic => {
                let Some(text) = query.query_text.as_deref().filter(|t| !t.is_empty()) else {
                    return Vec::new();
                };
                self.store
                    .search_semantic(collection, text, &query.filters, limit)
                    .await
            }
            SearchType::Hybrid => match (query.has_text(), query.has_keywords()) {
                (true, true) => {
                    self.store
                        .search_hybrid(
                            collection,
                            query.query_text.as_deref().unwrap_or_default(),
                            &query.keyword_query(),
                            &query.filters,
                            limit,
                        )
                        .await
                }
                // Only one side present: demote to the pure strategy.
                (true, false) => {
                    self.store
                        .search_semantic(
                            collection,
                            query.query_text.as_deref().unwrap_or_default(),
                            &query.filters,
                            limit,
                        )
                        .await
                }
                (false, true) => {
                    self.store
                        .search_keyword(collection, &query.keyword_query(), &query.filters, limit)
                        .await
                }
                (false, false) => return Vec::new(),
            },
        };

        match result {
            Ok(records) => records,
            Err(e) => {
                // Log and continue: one failed sub-query must not sink the cycle.
                tracing::warn!(
                    collection,
                    search_type = %query.search_type,
                    error = %e,
                    "memory query failed, contributing zero results"
                );
                Vec::new()
            }
        }
    }
}
