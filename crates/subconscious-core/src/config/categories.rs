//! Memory category configuration
//!
//! The category enumeration is supplied by the embedder, not hard-coded; the
//! defaults here match the stock category set.

use crate::error::{SubconsciousError, SubconsciousResult};
use serde::{Deserialize, Serialize};

/// A single memory category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    /// Category name as stored on records
    pub name: String,
    /// Human description, used in the authoring prompt
    #[serde(default)]
    pub description: String,
}

impl CategoryDef {
    /// Create a category
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// The configured set of memory categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCategories {
    /// Categories in display order
    pub categories: Vec<CategoryDef>,
}

impl Default for MemoryCategories {
    fn default() -> Self {
        Self {
            categories: vec![
                CategoryDef::new("conversation", "Exchanges with other agents or people"),
                CategoryDef::new("observation", "Things noticed about the environment"),
                CategoryDef::new("task", "Work undertaken, planned, or completed"),
                CategoryDef::new("relationship", "Facts about other agents and people"),
                CategoryDef::new("fact", "General knowledge worth keeping"),
            ],
        }
    }
}

impl MemoryCategories {
    /// Category names joined for prompt interpolation
    pub fn names(&self) -> String {
        self.categories
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether `name` is a configured category
    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    /// Fail fast when an unknown category is supplied at a configuration
    /// boundary (e.g. a category filter in embedder-provided config).
    pub fn validate(&self, name: &str) -> SubconsciousResult<()> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(SubconsciousError::unsupported("category", name))
        }
    }
}
