//! Weaviate-backed store
//!
//! Implements the store contract against Weaviate's REST and GraphQL APIs:
//! schema creation, object CRUD, and bm25/nearText/hybrid searches with a
//! `where` filter built from the compound filter predicate. Transport errors
//! get one bounded retry; malformed content is never retried.

use super::{MemoryStore, StoreError};
use crate::memory::types::{MemoryId, MemoryRecord, QueryFilters};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

const RECORD_FIELDS: &str =
    "summary category keywords critical_information importance timestamp location agent id";

/// Weaviate HTTP client implementing the store contract
pub struct WeaviateStore {
    base_url: String,
    api_key: Option<String>,
    http_client: Client,
}

impl WeaviateStore {
    /// Connect to a Weaviate instance
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, StoreError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Backend(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            http_client,
        })
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }

    /// Send a request, retrying once on a transport error. Connectivity is
    /// the only fault class with a retry; everything else surfaces directly.
    async fn send_with_retry(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        match self.request(build()).send().await {
            Ok(response) => Ok(response),
            Err(first) => {
                tracing::warn!(error = %first, "Weaviate request failed, retrying once");
                tokio::time::sleep(Duration::from_millis(200)).await;
                self.request(build())
                    .send()
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))
            }
        }
    }

    async fn graphql(&self, query: String) -> Result<Value, StoreError> {
        let url = format!("{}/v1/graphql", self.base_url);
        let body = json!({ "query": query });

        let response = self
            .send_with_retry(|| self.http_client.post(&url).json(&body))
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!(
                "GraphQL query failed (status {}): {}",
                status, text
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        if let Some(errors) = value.get("errors") {
            return Err(StoreError::Backend(format!("GraphQL errors: {}", errors)));
        }

        Ok(value)
    }

    fn parse_results(&self, response: &Value, collection: &str) -> Vec<MemoryRecord> {
        let Some(items) = response
            .pointer(&format!("/data/Get/{}", collection))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| match serde_json::from_value(item.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed record from Weaviate");
                    None
                }
            })
            .collect()
    }

    async fn search(
        &self,
        collection: &str,
        operator: &str,
        filters: &QueryFilters,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let mut args = vec![operator.to_string(), format!("limit: {}", limit)];
        if let Some(where_clause) = build_where(filters) {
            args.push(format!("where: {}", where_clause));
        }

        let query = format!(
            "{{ Get {{ {collection}({args}) {{ {fields} }} }} }}",
            collection = collection,
            args = args.join(", "),
            fields = RECORD_FIELDS,
        );

        let response = self.graphql(query).await?;
        Ok(self.parse_results(&response, collection))
    }
}

#[async_trait]
impl MemoryStore for WeaviateStore {
    async fn ensure_collection(&self, name: &str) -> Result<(), StoreError> {
        let schema_url = format!("{}/v1/schema", self.base_url);

        let response = self
            .send_with_retry(|| self.http_client.get(&schema_url))
            .await?;
        if !response.status().is_success() {
            return Err(StoreError::Backend(format!(
                "schema fetch failed with status {}",
                response.status()
            )));
        }

        let schema: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let exists = schema
            .pointer("/classes")
            .and_then(Value::as_array)
            .map(|classes| {
                classes
                    .iter()
                    .any(|c| c.pointer("/class").and_then(Value::as_str) == Some(name))
            })
            .unwrap_or(false);

        if exists {
            tracing::debug!(collection = name, "Weaviate collection already exists");
            return Ok(());
        }

        let class_def = json!({
            "class": name,
            "description": format!("Memory collection for {}", name),
            "vectorizer": "text2vec-transformers",
            "properties": [
                text_property("summary", "Summary of the memory", false),
                text_property("category", "Category of the memory", true),
                {
                    "name": "keywords",
                    "description": "Keywords related to the memory",
                    "dataType": ["text[]"],
                },
                text_property("critical_information", "Critical information in the memory", true),
                {
                    "name": "importance",
                    "description": "Importance of the memory (1-10)",
                    "dataType": ["int"],
                },
                text_property("timestamp", "Timestamp of the memory", true),
                text_property("location", "Location where the memory was created", true),
                text_property("agent", "Agent who owns the memory", true),
                text_property("id", "Unique ID of the memory", true),
            ],
        });

        let response = self
            .send_with_retry(|| self.http_client.post(&schema_url).json(&class_def))
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!(
                "collection creation failed (status {}): {}",
                status, text
            )));
        }

        tracing::info!(collection = name, "created Weaviate collection");
        Ok(())
    }

    async fn add(&self, collection: &str, mut record: MemoryRecord) -> Result<MemoryId, StoreError> {
        if record.id.is_empty() {
            record.id = MemoryId::new();
        }
        let id = record.id.clone();

        let url = format!("{}/v1/objects", self.base_url);
        let body = json!({
            "class": collection,
            "id": id.as_str(),
            "properties": serde_json::to_value(&record)?,
        });

        let response = self
            .send_with_retry(|| self.http_client.post(&url).json(&body))
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!(
                "object creation failed (status {}): {}",
                status, text
            )));
        }

        tracing::debug!(collection, id = %id, "added object to Weaviate");
        Ok(id)
    }

    async fn get(
        &self,
        collection: &str,
        id: &MemoryId,
    ) -> Result<Option<MemoryRecord>, StoreError> {
        let url = format!("{}/v1/objects/{}/{}", self.base_url, collection, id);

        let response = self
            .send_with_retry(|| self.http_client.get(&url))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Backend(format!(
                "object fetch failed with status {}",
                response.status()
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let properties = value
            .pointer("/properties")
            .cloned()
            .ok_or_else(|| StoreError::Backend("object response missing properties".to_string()))?;

        Ok(Some(serde_json::from_value(properties)?))
    }

    async fn delete(&self, collection: &str, id: &MemoryId) -> Result<bool, StoreError> {
        let url = format!("{}/v1/objects/{}/{}", self.base_url, collection, id);

        let response = self
            .send_with_retry(|| self.http_client.delete(&url))
            .await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(StoreError::Backend(format!(
                "object deletion failed with status {}",
                status
            ))),
        }
    }

    async fn search_keyword(
        &self,
        collection: &str,
        query: &str,
        filters: &QueryFilters,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let operator = format!("bm25: {{query: {}}}", gql_string(query));
        self.search(collection, &operator, filters, limit).await
    }

    async fn search_semantic(
        &self,
        collection: &str,
        query: &str,
        filters: &QueryFilters,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let operator = format!("nearText: {{concepts: [{}]}}", gql_string(query));
        self.search(collection, &operator, filters, limit).await
    }

    async fn search_hybrid(
        &self,
        collection: &str,
        semantic_query: &str,
        _keyword_query: &str,
        filters: &QueryFilters,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        // Weaviate's hybrid operator runs bm25 and vector search over the
        // same query string; alpha balances the two result sets.
        let operator = format!(
            "hybrid: {{query: {}, alpha: 0.5}}",
            gql_string(semantic_query)
        );
        self.search(collection, &operator, filters, limit).await
    }
}

fn text_property(name: &str, description: &str, skip_vectorization: bool) -> Value {
    json!({
        "name": name,
        "description": description,
        "dataType": ["text"],
        "moduleConfig": {
            "text2vec-transformers": {
                "skip": skip_vectorization,
                "vectorizePropertyName": false,
            }
        },
    })
}

/// Quote and escape a string for interpolation into GraphQL
fn gql_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Build a GraphQL `where` clause from the compound filter predicate;
/// multiple conditions are combined with And, a single one stands alone.
fn build_where(filters: &QueryFilters) -> Option<String> {
    let mut operands = Vec::new();

    if let Some(ref category) = filters.category {
        operands.push(format!(
            "{{path: [\"category\"], operator: Equal, valueString: {}}}",
            gql_string(category)
        ));
    }
    if let Some(min) = filters.min_importance {
        operands.push(format!(
            "{{path: [\"importance\"], operator: GreaterThanEqual, valueInt: {}}}",
            min
        ));
    }
    if let Some(max) = filters.max_importance {
        operands.push(format!(
            "{{path: [\"importance\"], operator: LessThanEqual, valueInt: {}}}",
            max
        ));
    }

    match operands.len() {
        0 => None,
        1 => Some(operands.remove(0)),
        _ => Some(format!(
            "{{operator: And, operands: [{}]}}",
            operands.join(", ")
        )),
    }
}
