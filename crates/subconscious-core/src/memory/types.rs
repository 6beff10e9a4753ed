//! Memory record and retrieval query types

use crate::error::SubconsciousError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique memory identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryId(pub String);

impl MemoryId {
    /// Create a new random memory ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create from string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the ID carries no value (store generates one on add)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MemoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic collection name for an agent's memories
pub fn collection_name(agent_name: &str) -> String {
    format!("Memories_{}", agent_name)
}

/// A persisted unit of agent knowledge.
///
/// Field names are the wire contract toward the store; records are treated as
/// immutable by the retrieval path once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Short natural-language description; the semantically indexed field
    pub summary: String,
    /// One of the configured category names
    pub category: String,
    /// Retrieval keywords (duplicates allowed at creation)
    pub keywords: Vec<String>,
    /// Decision-relevant detail carried alongside the summary
    pub critical_information: String,
    /// 1 (trivial) to 10 (life-changing)
    pub importance: i64,
    /// Creation time, ISO-8601, immutable once set
    pub timestamp: String,
    /// Where the memory was formed
    pub location: String,
    /// Owning agent
    pub agent: String,
    /// Unique identifier within the agent's collection
    pub id: MemoryId,
}

impl MemoryRecord {
    /// Creation timestamp as seconds since the epoch, 0 when unparseable.
    /// Used by the hybrid ranking key.
    pub fn timestamp_seconds(&self) -> i64 {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.timestamp())
            .or_else(|_| {
                // ISO-8601 without an offset, as chrono's NaiveDateTime
                self.timestamp
                    .parse::<chrono::NaiveDateTime>()
                    .map(|ndt| ndt.and_utc().timestamp())
            })
            .unwrap_or(0)
    }

    /// Render the record as the block injected into an agent's prompt
    pub fn to_prompt_block(&self) -> String {
        format!(
            "Memory:\n\
             - Summary: {}\n\
             - Category: {}\n\
             - Keywords: {}\n\
             - Critical Information: {}\n\
             - Importance: {}/10\n\
             - Time: {}\n\
             - Location: {}\n",
            self.summary,
            self.category,
            self.keywords.join(", "),
            self.critical_information,
            self.importance,
            self.timestamp,
            self.location,
        )
    }

    /// An ISO-8601 timestamp for "now"
    pub fn now_timestamp() -> String {
        Utc::now().to_rfc3339()
    }
}

/// Retrieval search strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Term match against summaries and keywords
    Keyword,
    /// Similarity search over summaries
    Semantic,
    /// Combined keyword and semantic search
    Hybrid,
}

impl SearchType {
    /// Lenient parse for planner output: unknown or missing strategies fall
    /// back to hybrid rather than discarding the query.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "keyword" => SearchType::Keyword,
            "semantic" => SearchType::Semantic,
            _ => SearchType::Hybrid,
        }
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchType::Keyword => write!(f, "keyword"),
            SearchType::Semantic => write!(f, "semantic"),
            SearchType::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl std::str::FromStr for SearchType {
    type Err = SubconsciousError;

    /// Strict parse for configuration boundaries
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" => Ok(SearchType::Keyword),
            "semantic" => Ok(SearchType::Semantic),
            "hybrid" => Ok(SearchType::Hybrid),
            other => Err(SubconsciousError::unsupported("search type", other)),
        }
    }
}

/// Compound filter predicate, combined with logical AND
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryFilters {
    /// Restrict to a category
    pub category: Option<String>,
    /// Minimum importance, inclusive
    pub min_importance: Option<i64>,
    /// Maximum importance, inclusive
    pub max_importance: Option<i64>,
}

impl QueryFilters {
    /// Whether no filter is set
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.min_importance.is_none() && self.max_importance.is_none()
    }

    /// Whether `record` satisfies every set filter
    pub fn matches(&self, record: &MemoryRecord) -> bool {
        if let Some(ref category) = self.category {
            if &record.category != category {
                return false;
            }
        }
        if let Some(min) = self.min_importance {
            if record.importance < min {
                return false;
            }
        }
        if let Some(max) = self.max_importance {
            if record.importance > max {
                return false;
            }
        }
        true
    }
}

/// A single search directive produced by the query planner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalQuery {
    /// Chosen strategy
    pub search_type: SearchType,
    /// Keywords for keyword/hybrid search
    pub keywords: Vec<String>,
    /// Free text for semantic/hybrid search
    pub query_text: Option<String>,
    /// Optional compound filters
    pub filters: QueryFilters,
}

impl Default for SearchType {
    fn default() -> Self {
        SearchType::Hybrid
    }
}

impl RetrievalQuery {
    /// Whether usable keywords are present
    pub fn has_keywords(&self) -> bool {
        self.keywords.iter().any(|k| !k.is_empty())
    }

    /// Whether usable query text is present
    pub fn has_text(&self) -> bool {
        self.query_text.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Keywords joined with logical OR for the store's keyword search
    pub fn keyword_query(&self) -> String {
        self.keywords.join(" OR ")
    }
}
