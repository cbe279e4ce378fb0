//! Policy knowledge-base client
//!
//! Full-text search over the indexed policy documents.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::core::{AegisError, Config, Result};

/// Knowledge-base collaborator contract
#[async_trait]
pub trait PolicySearch: Send + Sync {
    /// Find the policy document most relevant to the query text
    async fn query(&self, text: &str) -> Result<Value>;
}

/// HTTP client for the policy search index
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    base_url: String,
    index: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: PolicyDocument,
}

#[derive(Debug, Deserialize)]
struct PolicyDocument {
    policy_id: String,
    content: String,
}

impl SearchClient {
    /// Create a new search client from configuration
    pub fn from_config(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.search.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.search.base_url.clone(),
            index: config.search.index.clone(),
        }
    }

    /// Create a client with a custom base URL and index
    pub fn with_base_url(base_url: impl Into<String>, index: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            index: index.into(),
        }
    }

    /// One-shot reachability probe, used once at startup.
    ///
    /// Bootstrapping with retry/backoff belongs to the deployment layer; a
    /// failed probe leaves the knowledge base unavailable for the process
    /// lifetime.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;

        if !response.status().is_success() {
            return Err(AegisError::tool(format!(
                "Search cluster returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn connect_error(&self, e: reqwest::Error) -> AegisError {
        if e.is_connect() {
            AegisError::tool(format!(
                "Cannot connect to the search cluster at {}. Is it running?",
                self.base_url
            ))
        } else {
            AegisError::from(e)
        }
    }
}

#[async_trait]
impl PolicySearch for SearchClient {
    async fn query(&self, text: &str) -> Result<Value> {
        tracing::debug!(index = %self.index, "searching policies");

        let body = json!({
            "query": { "match": { "content": text } },
            "size": 1
        });

        let response = self
            .client
            .post(format!("{}/{}/_search", self.base_url, self.index))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AegisError::tool(format!(
                "Search error ({}): {}",
                status, error_text
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AegisError::tool(format!("Failed to parse search response: {}", e)))?;

        Ok(match parsed.hits.hits.first() {
            Some(hit) => json!({
                "policy_found": true,
                "policy_id": hit.source.policy_id,
                "policy_content": hit.source.content,
            }),
            None => json!({
                "policy_found": false,
                "policy_content": "",
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_shape() {
        let json = r#"{"hits": {"hits": [
            {"_source": {"policy_id": "failed_payment_policy", "content": "Retry once, then escalate."}}
        ]}}"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.hits.hits.len(), 1);
        assert_eq!(parsed.hits.hits[0].source.policy_id, "failed_payment_policy");
    }

    #[test]
    fn test_search_response_empty_hits() {
        let json = r#"{"hits": {"hits": []}}"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.hits.hits.is_empty());
    }
}
