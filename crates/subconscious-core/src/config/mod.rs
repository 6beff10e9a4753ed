//! Engine configuration

pub mod categories;
pub mod provider;

pub use categories::{CategoryDef, MemoryCategories};
pub use provider::ProviderConfig;

use crate::error::{SubconsciousError, SubconsciousResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bounds on a retrieval cycle.
///
/// The 3 x 3 cap is a deliberate trade-off between recall and prompt size,
/// not a correctness requirement, so the bounds are configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalLimits {
    /// Maximum planned queries per cycle
    pub max_queries: usize,
    /// Maximum hits requested from the store per query
    pub hits_per_query: usize,
    /// Maximum records returned after merge/rank/dedup
    pub max_results: usize,
}

impl Default for RetrievalLimits {
    fn default() -> Self {
        Self {
            max_queries: 3,
            hits_per_query: 3,
            max_results: 9,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Text-generation provider settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Memory category enumeration
    #[serde(default)]
    pub categories: MemoryCategories,
    /// Retrieval bounds
    #[serde(default)]
    pub retrieval: RetrievalLimits,
    /// Conversation turns given to the query planner
    #[serde(default = "default_planning_window")]
    pub planning_window: usize,
    /// Conversation turns given to memory authoring
    #[serde(default = "default_authoring_window")]
    pub authoring_window: usize,
}

fn default_planning_window() -> usize {
    5
}

fn default_authoring_window() -> usize {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            categories: MemoryCategories::default(),
            retrieval: RetrievalLimits::default(),
            planning_window: default_planning_window(),
            authoring_window: default_authoring_window(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> SubconsciousResult<Self> {
        toml::from_str(content).map_err(|e| SubconsciousError::config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub async fn load(path: impl AsRef<Path>) -> SubconsciousResult<Self> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| SubconsciousError::config(format!("failed to read config: {}", e)))?;
        Self::from_toml_str(&content)
    }
}
