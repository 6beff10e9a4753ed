//! Memory lifecycle: authoring and merging
//!
//! Turns recent conversation into a persisted record by asking the model for
//! a tagged memory block, filling gaps with defaults, and writing through the
//! store. A failed or malformed generation produces no memory; a failed write
//! is an error, because a silently dropped write loses the memory for good.

use crate::config::categories::MemoryCategories;
use crate::error::SubconsciousResult;
use crate::extract;
use crate::llm::generator::TextGenerator;
use crate::llm::messages::{transcript, ChatMessage};
use crate::memory::store::MemoryStore;
use crate::memory::types::{MemoryId, MemoryRecord};
use crate::prompts;
use std::sync::Arc;

const DEFAULT_IMPORTANCE: i64 = 5;
const MERGED_SUMMARY_LIMIT: usize = 200;
const MERGED_KEYWORD_LIMIT: usize = 10;

/// Assigns an importance to a record the model left unscored
pub trait ImportanceScorer: Send + Sync {
    /// Score from the record's critical information, 1 to 10
    fn score(&self, critical_information: &str) -> i64;
}

/// Length-based fallback scorer: more recorded detail, higher importance
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicScorer;

impl ImportanceScorer for HeuristicScorer {
    fn score(&self, critical_information: &str) -> i64 {
        match critical_information.len() {
            n if n > 200 => 8,
            n if n > 100 => 7,
            n if n > 50 => 6,
            _ => DEFAULT_IMPORTANCE,
        }
    }
}

/// Authors new memories from conversation
pub struct LifecycleManager {
    llm: Arc<dyn TextGenerator>,
    store: Arc<dyn MemoryStore>,
    agent_name: String,
    categories: MemoryCategories,
    scorer: Box<dyn ImportanceScorer>,
}

impl LifecycleManager {
    /// Create a manager with the default length heuristic scorer
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        store: Arc<dyn MemoryStore>,
        agent_name: impl Into<String>,
        categories: MemoryCategories,
    ) -> Self {
        Self {
            llm,
            store,
            agent_name: agent_name.into(),
            categories,
            scorer: Box::new(HeuristicScorer),
        }
    }

    /// Replace the fallback importance scorer
    pub fn with_scorer(mut self, scorer: Box<dyn ImportanceScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Author a memory from the given conversation window and persist it.
    ///
    /// Returns `Ok(None)` when the conversation is empty or the model fails
    /// to produce a usable memory block; write failures propagate.
    pub async fn create_from_conversation(
        &self,
        collection: &str,
        conversation: &[ChatMessage],
        location: &str,
    ) -> SubconsciousResult<Option<MemoryRecord>> {
        if conversation.is_empty() {
            return Ok(None);
        }

        let prompt = format!(
            "Create a memory based on this conversation at location '{}':\n\n{}",
            location,
            transcript(conversation)
        );
        let system_prompt = prompts::memory_creation_prompt(&self.agent_name, &self.categories);

        let response = match self.llm.generate(&prompt, Some(&system_prompt)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(agent = %self.agent_name, error = %e, "memory authoring failed, nothing stored");
                return Ok(None);
            }
        };

        let Some(record) = self.parse_memory(&response, location) else {
            tracing::warn!(agent = %self.agent_name, "no usable memory block in authoring response");
            return Ok(None);
        };

        let id = self.store.add(collection, record.clone()).await?;
        tracing::info!(
            agent = %self.agent_name,
            collection,
            id = %id,
            importance = record.importance,
            "stored new memory"
        );
        Ok(Some(record))
    }

    fn parse_memory(&self, response: &str, location: &str) -> Option<MemoryRecord> {
        // Models sometimes emit the fields without the <memory> wrapper;
        // fall back to extracting from the whole response rather than
        // dropping the turn's memory.
        let block = extract::blocks(response, "memory")
            .into_iter()
            .next()
            .unwrap_or_else(|| response.to_string());
        let summary = extract::field(&block, "summary").filter(|s| !s.is_empty())?;

        let critical_information = extract::field(&block, "critical_information").unwrap_or_default();
        // A present-but-garbled importance falls to the fixed default; an
        // absent one is scored from how much detail was recorded.
        let importance = extract::int_field_or(&block, "importance", DEFAULT_IMPORTANCE)
            .unwrap_or_else(|| self.scorer.score(&critical_information))
            .clamp(1, 10);

        Some(MemoryRecord {
            summary,
            category: extract::field(&block, "category")
                .filter(|c| self.categories.contains(c))
                .unwrap_or_else(|| "conversation".to_string()),
            keywords: extract::list_field(&block, "keywords").unwrap_or_default(),
            critical_information,
            importance,
            timestamp: MemoryRecord::now_timestamp(),
            location: location.to_string(),
            agent: self.agent_name.clone(),
            id: MemoryId::new(),
        })
    }
}

/// Combine related records into one summary record.
///
/// Merging is additive; the inputs are left in place. Returns `None` for an
/// empty slice and a plain clone for a single record.
pub fn merge_records(records: &[MemoryRecord]) -> Option<MemoryRecord> {
    let first = records.first()?;
    if records.len() == 1 {
        return Some(first.clone());
    }

    let mut summary = records
        .iter()
        .map(|r| r.summary.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if summary.len() > MERGED_SUMMARY_LIMIT {
        // Back off to a char boundary; summaries are free text and the
        // limit may land inside a multi-byte character.
        let mut cut = MERGED_SUMMARY_LIMIT;
        while !summary.is_char_boundary(cut) {
            cut -= 1;
        }
        summary.truncate(cut);
        summary.push_str("...");
    }

    let mut keywords: Vec<String> = Vec::new();
    for keyword in records.iter().flat_map(|r| &r.keywords) {
        if keywords.len() >= MERGED_KEYWORD_LIMIT {
            break;
        }
        if !keywords.contains(keyword) {
            keywords.push(keyword.clone());
        }
    }

    let critical_information = records
        .iter()
        .map(|r| r.critical_information.as_str())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Some(MemoryRecord {
        summary,
        category: first.category.clone(),
        keywords,
        critical_information,
        importance: records.iter().map(|r| r.importance).max().unwrap_or(first.importance),
        timestamp: records
            .iter()
            .map(|r| r.timestamp.clone())
            .max()
            .unwrap_or_else(|| first.timestamp.clone()),
        location: first.location.clone(),
        agent: first.agent.clone(),
        id: MemoryId::from_string(format!("merged_{}", first.id)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SubconsciousError, SubconsciousResult};
    use crate::memory::store::InMemoryStore;
    use async_trait::async_trait;

    struct ScriptedGenerator {
        response: Option<String>,
    }

    impl ScriptedGenerator {
        fn ok(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Some(response.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { response: None })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _system_prompt: Option<&str>,
        ) -> SubconsciousResult<String> {
            match &self.response {
                Some(text) => Ok(text.clone()),
                None => Err(SubconsciousError::llm("model unavailable")),
            }
        }
    }

    fn manager(llm: Arc<dyn TextGenerator>, store: Arc<InMemoryStore>) -> LifecycleManager {
        LifecycleManager::new(llm, store, "alice", MemoryCategories::default())
    }

    fn record(id: &str, summary: &str, importance: i64, timestamp: &str) -> MemoryRecord {
        MemoryRecord {
            summary: summary.to_string(),
            category: "fact".to_string(),
            keywords: vec![],
            critical_information: String::new(),
            importance,
            timestamp: timestamp.to_string(),
            location: "lab".to_string(),
            agent: "alice".to_string(),
            id: MemoryId::from_string(id),
        }
    }

    const AUTHORED: &str = r#"
        <memory>
          <summary>Met the new engineer and discussed the deadline</summary>
          <category>conversation</category>
          <keywords>engineer, deadline, introduction</keywords>
          <critical_information>Deadline moved to Friday</critical_information>
          <importance>7</importance>
        </memory>
    "#;

    #[tokio::test]
    async fn test_create_persists_authored_memory() {
        let store = Arc::new(InMemoryStore::new());
        let manager = manager(ScriptedGenerator::ok(AUTHORED), store.clone());

        let created = manager
            .create_from_conversation("Memories_alice", &[ChatMessage::user("hello")], "lab")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(created.importance, 7);
        assert_eq!(created.location, "lab");
        assert_eq!(created.agent, "alice");
        assert_eq!(created.keywords.len(), 3);
        assert_eq!(store.count("Memories_alice").await, 1);
    }

    #[tokio::test]
    async fn test_create_empty_conversation_is_none() {
        let store = Arc::new(InMemoryStore::new());
        let manager = manager(ScriptedGenerator::ok(AUTHORED), store.clone());

        let created = manager
            .create_from_conversation("c", &[], "lab")
            .await
            .unwrap();

        assert!(created.is_none());
        assert_eq!(store.count("c").await, 0);
    }

    #[tokio::test]
    async fn test_create_generation_failure_is_none() {
        let store = Arc::new(InMemoryStore::new());
        let manager = manager(ScriptedGenerator::failing(), store.clone());

        let created = manager
            .create_from_conversation("c", &[ChatMessage::user("hello")], "lab")
            .await
            .unwrap();

        assert!(created.is_none());
        assert_eq!(store.count("c").await, 0);
    }

    #[tokio::test]
    async fn test_create_without_memory_fields_is_none() {
        let store = Arc::new(InMemoryStore::new());
        let manager = manager(ScriptedGenerator::ok("I have nothing to add."), store);

        let created = manager
            .create_from_conversation("c", &[ChatMessage::user("hello")], "lab")
            .await
            .unwrap();

        assert!(created.is_none());
    }

    #[tokio::test]
    async fn test_create_accepts_unwrapped_fields() {
        let response = "<summary>Bob shared the launch date</summary><importance>7</importance>";
        let store = Arc::new(InMemoryStore::new());
        let manager = manager(ScriptedGenerator::ok(response), store.clone());

        let created = manager
            .create_from_conversation("c", &[ChatMessage::user("hi")], "lab")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(created.summary, "Bob shared the launch date");
        assert_eq!(created.importance, 7);
        assert_eq!(store.count("c").await, 1);
    }

    #[tokio::test]
    async fn test_unparseable_importance_defaults_to_five() {
        let response = "<memory><summary>something</summary><importance>very</importance></memory>";
        let store = Arc::new(InMemoryStore::new());
        let manager = manager(ScriptedGenerator::ok(response), store);

        let created = manager
            .create_from_conversation("c", &[ChatMessage::user("hi")], "lab")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(created.importance, 5);
    }

    #[tokio::test]
    async fn test_missing_importance_scored_from_detail_length() {
        let detail = "d".repeat(120);
        let response = format!(
            "<memory><summary>something</summary><critical_information>{}</critical_information></memory>",
            detail
        );
        let store = Arc::new(InMemoryStore::new());
        let manager = manager(ScriptedGenerator::ok(&response), store);

        let created = manager
            .create_from_conversation("c", &[ChatMessage::user("hi")], "lab")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(created.importance, 7);
    }

    #[tokio::test]
    async fn test_unknown_category_falls_back() {
        let response =
            "<memory><summary>something</summary><category>daydream</category></memory>";
        let store = Arc::new(InMemoryStore::new());
        let manager = manager(ScriptedGenerator::ok(response), store);

        let created = manager
            .create_from_conversation("c", &[ChatMessage::user("hi")], "lab")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(created.category, "conversation");
    }

    #[test]
    fn test_heuristic_scorer_thresholds() {
        let scorer = HeuristicScorer;
        assert_eq!(scorer.score(&"x".repeat(201)), 8);
        assert_eq!(scorer.score(&"x".repeat(101)), 7);
        assert_eq!(scorer.score(&"x".repeat(51)), 6);
        assert_eq!(scorer.score("short"), 5);
    }

    #[test]
    fn test_merge_empty_is_none() {
        assert!(merge_records(&[]).is_none());
    }

    #[test]
    fn test_merge_single_is_unchanged() {
        let r = record("m-1", "alone", 6, "2024-05-01T12:00:00+00:00");
        let merged = merge_records(&[r.clone()]).unwrap();
        assert_eq!(merged, r);
    }

    #[test]
    fn test_merge_combines_fields() {
        let mut a = record("m-1", "first summary", 4, "2024-05-01T12:00:00+00:00");
        a.keywords = vec!["alpha".to_string(), "beta".to_string()];
        a.critical_information = "detail one".to_string();
        let mut b = record("m-2", "second summary", 8, "2024-05-03T12:00:00+00:00");
        b.keywords = vec!["beta".to_string(), "gamma".to_string()];
        b.critical_information = "detail two".to_string();

        let merged = merge_records(&[a, b]).unwrap();

        assert_eq!(merged.summary, "first summary second summary");
        assert_eq!(merged.keywords, vec!["alpha", "beta", "gamma"]);
        assert_eq!(merged.critical_information, "detail one detail two");
        assert_eq!(merged.importance, 8);
        assert_eq!(merged.timestamp, "2024-05-03T12:00:00+00:00");
        assert_eq!(merged.id.as_str(), "merged_m-1");
        assert_eq!(merged.category, "fact");
    }

    #[test]
    fn test_merge_truncates_long_summary() {
        let a = record("m-1", &"a".repeat(150), 5, "2024-05-01T12:00:00+00:00");
        let b = record("m-2", &"b".repeat(150), 5, "2024-05-01T12:00:00+00:00");

        let merged = merge_records(&[a, b]).unwrap();

        assert_eq!(merged.summary.len(), 203);
        assert!(merged.summary.ends_with("..."));
    }

    #[test]
    fn test_merge_truncation_respects_char_boundaries() {
        // The byte limit lands inside the 'é' at the start of the second
        // summary; truncation must back off instead of panicking.
        let a = record("m-1", &"a".repeat(198), 5, "2024-05-01T12:00:00+00:00");
        let b = record("m-2", "émigré filed the report", 5, "2024-05-01T12:00:00+00:00");

        let merged = merge_records(&[a, b]).unwrap();

        assert!(merged.summary.len() <= 203);
        assert!(merged.summary.ends_with("..."));
        assert!(merged.summary.is_char_boundary(merged.summary.len() - 3));
    }

    #[test]
    fn test_merge_caps_keywords_at_ten() {
        let mut a = record("m-1", "many words", 5, "2024-05-01T12:00:00+00:00");
        a.keywords = (0..8).map(|i| format!("kw{}", i)).collect();
        let mut b = record("m-2", "more words", 5, "2024-05-01T12:00:00+00:00");
        b.keywords = (8..16).map(|i| format!("kw{}", i)).collect();

        let merged = merge_records(&[a, b]).unwrap();
        assert_eq!(merged.keywords.len(), 10);
        assert_eq!(merged.keywords[0], "kw0");
        assert_eq!(merged.keywords[9], "kw9");
    }
}
