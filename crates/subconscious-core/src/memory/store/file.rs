//! File-backed store
//!
//! Same matching semantics as the in-memory reference, with every collection
//! persisted to a single JSON file. Loaded on open, saved on mutation.

use super::{hybrid_rank_key, keyword_matches, keyword_terms, MemoryStore, StoreError};
use crate::memory::types::{MemoryId, MemoryRecord, QueryFilters};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

type Collections = HashMap<String, HashMap<String, MemoryRecord>>;

/// On-disk format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    collections: Collections,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: 1,
            collections: HashMap::new(),
        }
    }
}

/// JSON-file-backed implementation of the store contract
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    collections: RwLock<Collections>,
}

impl FileStore {
    /// Open a store at `path`, loading existing contents when present
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let collections = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let file: StoreFile = serde_json::from_str(&content)?;
            file.collections
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            collections: RwLock::new(collections),
        })
    }

    /// Storage path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Force a save to disk
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.save().await
    }

    async fn save(&self) -> Result<(), StoreError> {
        let collections = self.collections.read().await;
        let file = StoreFile {
            version: 1,
            collections: collections.clone(),
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&file)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
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
impl MemoryStore for FileStore {
    async fn ensure_collection(&self, name: &str) -> Result<(), StoreError> {
        {
            let mut collections = self.collections.write().await;
            if collections.contains_key(name) {
                return Ok(());
            }
            collections.insert(name.to_string(), HashMap::new());
        }
        self.save().await
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

        self.save().await?;
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
        let removed = self
            .collections
            .write()
            .await
            .get_mut(collection)
            .and_then(|c| c.remove(id.as_str()))
            .is_some();

        if removed {
            self.save().await?;
        }
        Ok(removed)
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
