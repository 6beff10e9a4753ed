//! In-memory reference store
//!
//! Backed by a plain map of id to record per collection. Keyword search is
//! substring match, semantic search is substring match over summaries (real
//! embedding search belongs to the production backend), hybrid is the union
//! of both under the combined importance/recency key.

use super::{hybrid_rank_key, keyword_matches, keyword_terms, MemoryStore, StoreError};
use crate::memory::types::{MemoryId, MemoryRecord, QueryFilters};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

type Collection = HashMap<String, MemoryRecord>;

/// Reference in-memory implementation of the store contract
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection (0 when absent)
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    async fn filtered(&self, collection: &str, filters: &QueryFilters) -> Vec<MemoryRecord> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(collection) else {
            return Vec::new();
        };
        records
            .values()
            .filter(|record| filters.matches(record))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn ensure_collection(&self, name: &str) -> Result<(), StoreError> {
        self.collections
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        tracing::debug!(collection = name, "ensured in-memory collection");
        Ok(())
    }

    async fn add(&self, collection: &str, mut record: MemoryRecord) -> Result<MemoryId, StoreError> {
        if record.id.is_empty() {
            record.id = MemoryId::new();
        }
        let id = record.id.clone();

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.as_str().to_string(), record);

        Ok(id)
    }

    async fn get(
        &self,
        collection: &str,
        id: &MemoryId,
    ) -> Result<Option<MemoryRecord>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|c| c.get(id.as_str()))
            .cloned())
    }

    async fn delete(&self, collection: &str, id: &MemoryId) -> Result<bool, StoreError> {
        Ok(self
            .collections
            .write()
            .await
            .get_mut(collection)
            .and_then(|c| c.remove(id.as_str()))
            .is_some())
    }

    async fn search_keyword(
        &self,
        collection: &str,
        query: &str,
        filters: &QueryFilters,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let terms = keyword_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<MemoryRecord> = self
            .filtered(collection, filters)
            .await
            .into_iter()
            .filter(|record| keyword_matches(record, &terms))
            .collect();

        results.sort_by(|a, b| b.importance.cmp(&a.importance));
        results.truncate(limit);
        Ok(results)
    }

    async fn search_semantic(
        &self,
        collection: &str,
        query: &str,
        filters: &QueryFilters,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let needle = query.to_lowercase();

        let mut results: Vec<MemoryRecord> = self
            .filtered(collection, filters)
            .await
            .into_iter()
            .filter(|record| record.summary.to_lowercase().contains(&needle))
            .collect();

        // Recency as a proxy for relevance
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        results.truncate(limit);
        Ok(results)
    }

    async fn search_hybrid(
        &self,
        collection: &str,
        semantic_query: &str,
        keyword_query: &str,
        filters: &QueryFilters,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let semantic = self
            .search_semantic(collection, semantic_query, filters, limit * 2)
            .await?;
        let keyword = self
            .search_keyword(collection, keyword_query, filters, limit * 2)
            .await?;

        let mut seen = std::collections::HashSet::new();
        let mut combined: Vec<MemoryRecord> = Vec::new();
        for record in semantic.into_iter().chain(keyword) {
            if seen.insert(record.id.clone()) {
                combined.push(record);
            }
        }

        combined.sort_by_key(|record| std::cmp::Reverse(hybrid_rank_key(record)));
        combined.truncate(limit);
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(summary: &str, importance: i64, timestamp: &str) -> MemoryRecord {
        MemoryRecord {
            summary: summary.to_string(),
            category: "fact".to_string(),
            keywords: vec!["memo".to_string()],
            critical_information: "details".to_string(),
            importance,
            timestamp: timestamp.to_string(),
            location: "lab".to_string(),
            agent: "alice".to_string(),
            id: MemoryId::new(),
        }
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let store = InMemoryStore::new();
        let r = record("the lights flickered", 5, "2024-05-01T12:00:00+00:00");
        let id = store.add("Memories_alice", r.clone()).await.unwrap();

        let fetched = store.get("Memories_alice", &id).await.unwrap().unwrap();
        assert_eq!(fetched.summary, "the lights flickered");
    }

    #[tokio::test]
    async fn test_add_generates_id_when_empty() {
        let store = InMemoryStore::new();
        let mut r = record("anonymous", 5, "2024-05-01T12:00:00+00:00");
        r.id = MemoryId::from_string("");

        let id = store.add("c", r).await.unwrap();
        assert!(!id.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_by_id() {
        let store = InMemoryStore::new();
        let mut r = record("v1", 5, "2024-05-01T12:00:00+00:00");
        r.id = MemoryId::from_string("fixed");
        store.add("c", r.clone()).await.unwrap();

        r.summary = "v2".to_string();
        store.add("c", r).await.unwrap();

        assert_eq!(store.count("c").await, 1);
        let fetched = store
            .get("c", &MemoryId::from_string("fixed"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.summary, "v2");
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryStore::new();
        let id = store
            .add("c", record("gone soon", 5, "2024-05-01T12:00:00+00:00"))
            .await
            .unwrap();

        assert!(store.delete("c", &id).await.unwrap());
        assert!(!store.delete("c", &id).await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_collection_idempotent() {
        let store = InMemoryStore::new();
        store.ensure_collection("c").await.unwrap();
        store
            .add("c", record("kept", 5, "2024-05-01T12:00:00+00:00"))
            .await
            .unwrap();
        store.ensure_collection("c").await.unwrap();
        assert_eq!(store.count("c").await, 1);
    }

    #[tokio::test]
    async fn test_keyword_search_ranks_by_importance() {
        let store = InMemoryStore::new();
        store
            .add("c", record("meeting about budget", 3, "2024-05-01T12:00:00+00:00"))
            .await
            .unwrap();
        store
            .add("c", record("meeting about deadline", 8, "2024-05-01T12:00:00+00:00"))
            .await
            .unwrap();
        store
            .add("c", record("quiet afternoon", 9, "2024-05-01T12:00:00+00:00"))
            .await
            .unwrap();

        let results = store
            .search_keyword("c", "meeting", &QueryFilters::default(), 3)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].importance, 8);
    }

    #[tokio::test]
    async fn test_semantic_search_ranks_by_recency() {
        let store = InMemoryStore::new();
        store
            .add("c", record("storm warning issued", 5, "2024-05-01T12:00:00+00:00"))
            .await
            .unwrap();
        store
            .add("c", record("storm passed overnight", 5, "2024-05-02T12:00:00+00:00"))
            .await
            .unwrap();

        let results = store
            .search_semantic("c", "storm", &QueryFilters::default(), 3)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].summary.contains("passed"));
    }

    #[tokio::test]
    async fn test_hybrid_search_unions_and_ranks() {
        let store = InMemoryStore::new();
        // Matches semantically (summary) and by keyword; must count once.
        store
            .add("c", record("deadline moved to friday", 6, "2024-05-01T12:00:00+00:00"))
            .await
            .unwrap();
        // Keyword-only match through its keywords list.
        let mut kw_only = record("schedule shuffled", 4, "2024-05-01T12:00:00+00:00");
        kw_only.keywords = vec!["deadline".to_string()];
        store.add("c", kw_only).await.unwrap();

        let results = store
            .search_hybrid("c", "deadline", "deadline", &QueryFilters::default(), 5)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].importance, 6);
    }

    #[tokio::test]
    async fn test_filters_applied_to_search() {
        let store = InMemoryStore::new();
        store
            .add("c", record("filtered out", 2, "2024-05-01T12:00:00+00:00"))
            .await
            .unwrap();
        store
            .add("c", record("filtered in", 7, "2024-05-01T12:00:00+00:00"))
            .await
            .unwrap();

        let filters = QueryFilters {
            min_importance: Some(5),
            ..Default::default()
        };
        let results = store.search_keyword("c", "filtered", &filters, 5).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].importance, 7);
    }

    #[tokio::test]
    async fn test_search_missing_collection_is_empty() {
        let store = InMemoryStore::new();
        let results = store
            .search_semantic("nope", "anything", &QueryFilters::default(), 5)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
