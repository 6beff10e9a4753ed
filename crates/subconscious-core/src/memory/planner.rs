//! Multi-query retrieval planner
//!
//! Turns recent conversation plus the current location into up to
//! `max_queries` structured retrieval queries by asking the model and parsing
//! its loosely-tagged response. Planning faults degrade to an empty plan,
//! never an error.

use crate::extract;
use crate::llm::generator::TextGenerator;
use crate::llm::messages::{transcript, ChatMessage};
use crate::memory::types::{QueryFilters, RetrievalQuery, SearchType};
use crate::prompts;
use std::sync::Arc;

/// Plans retrieval queries for a single agent
pub struct QueryPlanner {
    llm: Arc<dyn TextGenerator>,
    agent_name: String,
    max_queries: usize,
}

impl QueryPlanner {
    /// Create a planner for `agent_name`
    pub fn new(llm: Arc<dyn TextGenerator>, agent_name: impl Into<String>, max_queries: usize) -> Self {
        Self {
            llm,
            agent_name: agent_name.into(),
            max_queries,
        }
    }

    /// Produce at most `max_queries` queries from the given conversation
    /// window. A failed or malformed generation yields an empty plan.
    pub async fn plan(&self, conversation: &[ChatMessage], location: &str) -> Vec<RetrievalQuery> {
        if conversation.is_empty() {
            return Vec::new();
        }

        let prompt = format!(
            "Create memory queries based on this conversation at location '{}':\n\n{}",
            location,
            transcript(conversation)
        );
        let system_prompt = prompts::memory_retrieval_prompt(&self.agent_name);

        let response = match self.llm.generate(&prompt, Some(&system_prompt)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(agent = %self.agent_name, error = %e, "query planning failed, retrieving nothing");
                return Vec::new();
            }
        };

        let queries = parse_queries(&response, self.max_queries);
        tracing::debug!(agent = %self.agent_name, count = queries.len(), "planned retrieval queries");
        queries
    }
}

/// Parse `<query>` blocks out of a planning response, capped at `max`.
pub fn parse_queries(response: &str, max: usize) -> Vec<RetrievalQuery> {
    extract::blocks(response, "query")
        .into_iter()
        .take(max)
        .map(|block| parse_query_block(&block))
        .collect()
}

fn parse_query_block(block: &str) -> RetrievalQuery {
    let search_type = extract::field(block, "search_type")
        .map(|s| SearchType::parse_lenient(&s))
        .unwrap_or(SearchType::Hybrid);

    let keywords = extract::list_field(block, "keywords").unwrap_or_default();
    let query_text = extract::field(block, "query_text");

    // Numeric filter bounds that fail to parse are silently omitted, unlike
    // the importance default applied during authoring.
    let filters = match extract::field(block, "filters") {
        Some(filters_block) => QueryFilters {
            category: extract::field(&filters_block, "category"),
            min_importance: extract::int_field(&filters_block, "min_importance"),
            max_importance: extract::int_field(&filters_block, "max_importance"),
        },
        None => QueryFilters::default(),
    };

    RetrievalQuery {
        search_type,
        keywords,
        query_text,
        filters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SubconsciousError, SubconsciousResult};
    use async_trait::async_trait;

    /// Generator that replays a scripted response
    struct ScriptedGenerator {
        response: SubconsciousResult<String>,
    }

    impl ScriptedGenerator {
        fn ok(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(response.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: Err(SubconsciousError::llm("model unavailable")),
            })
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
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(SubconsciousError::llm("model unavailable")),
            }
        }
    }

    fn query_block(n: usize) -> String {
        format!(
            "<query><search_type>keyword</search_type><keywords>topic{}</keywords></query>",
            n
        )
    }

    #[tokio::test]
    async fn test_plan_caps_at_three() {
        let response: String = (0..5).map(query_block).collect();
        let planner = QueryPlanner::new(ScriptedGenerator::ok(&response), "alice", 3);

        let queries = planner.plan(&[ChatMessage::user("hi")], "lab").await;

        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0].keywords, vec!["topic0"]);
        assert_eq!(queries[2].keywords, vec!["topic2"]);
    }

    #[tokio::test]
    async fn test_plan_empty_conversation_short_circuits() {
        let planner = QueryPlanner::new(ScriptedGenerator::ok("unused"), "alice", 3);
        assert!(planner.plan(&[], "lab").await.is_empty());
    }

    #[tokio::test]
    async fn test_plan_malformed_response_is_empty() {
        let planner = QueryPlanner::new(ScriptedGenerator::ok("no queries here"), "alice", 3);
        assert!(planner.plan(&[ChatMessage::user("hi")], "lab").await.is_empty());
    }

    #[tokio::test]
    async fn test_plan_generation_failure_is_empty() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let planner = QueryPlanner::new(ScriptedGenerator::failing(), "alice", 3);
        assert!(planner.plan(&[ChatMessage::user("hi")], "lab").await.is_empty());
    }

    #[test]
    fn test_parse_full_query_block() {
        let response = r#"
            <memory_queries>
              <query>
                <search_type>hybrid</search_type>
                <keywords>meeting, project, deadline</keywords>
                <query_text>Important information about the project deadline</query_text>
                <filters>
                  <category>conversation</category>
                  <min_importance>5</min_importance>
                </filters>
              </query>
            </memory_queries>
        "#;

        let queries = parse_queries(response, 3);
        assert_eq!(queries.len(), 1);

        let q = &queries[0];
        assert_eq!(q.search_type, SearchType::Hybrid);
        assert_eq!(q.keywords, vec!["meeting", "project", "deadline"]);
        assert_eq!(
            q.query_text.as_deref(),
            Some("Important information about the project deadline")
        );
        assert_eq!(q.filters.category.as_deref(), Some("conversation"));
        assert_eq!(q.filters.min_importance, Some(5));
        assert_eq!(q.filters.max_importance, None);
    }

    #[test]
    fn test_parse_unknown_search_type_defaults_to_hybrid() {
        let response = "<query><search_type>vector</search_type><query_text>x</query_text></query>";
        let queries = parse_queries(response, 3);
        assert_eq!(queries[0].search_type, SearchType::Hybrid);
    }

    #[test]
    fn test_parse_unparseable_filter_bound_is_omitted() {
        let response = "<query><query_text>x</query_text><filters><min_importance>high</min_importance></filters></query>";
        let queries = parse_queries(response, 3);
        assert_eq!(queries[0].filters.min_importance, None);
    }
}
