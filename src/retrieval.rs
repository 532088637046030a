//! Vector-search collaborator interface.
//!
//! Embedding computation and ranking live entirely inside the external
//! service; this module only defines the seam the registry's search tools
//! forward through. Hits come back in service order, no scoring semantics
//! are assumed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ToolbeltError};

/// A single row returned by the vector-search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub item_id: String,
    pub description: String,
}

/// Client for the external semantic-similarity search over the product catalog
pub trait VectorSearchClient: Send + Sync {
    /// Return the top `num_results` rows most relevant to the query string
    fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>>;
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    index: &'a str,
    query: &'a str,
    num_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Vec<SearchHit>,
}

/// HTTP implementation speaking JSON to a managed vector-search endpoint
pub struct HttpVectorSearchClient {
    endpoint: String,
    index: String,
    client: reqwest::blocking::Client,
}

impl HttpVectorSearchClient {
    /// Point the client at an endpoint URL and index name
    pub fn new(endpoint: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            index: index.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl VectorSearchClient for HttpVectorSearchClient {
    fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>> {
        debug!(index = %self.index, num_results, "vector search request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&SearchRequest {
                index: &self.index,
                query,
                num_results,
            })
            .send()
            .map_err(|e| ToolbeltError::Execution(format!("vector search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ToolbeltError::Execution(format!(
                "vector search returned status {}",
                response.status()
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .map_err(|e| ToolbeltError::Execution(format!("malformed vector search response: {}", e)))?;

        Ok(parsed.hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_hit_roundtrip() {
        let hit = SearchHit {
            item_id: "I2".to_string(),
            description: "Silk scarf".to_string(),
        };
        let json = serde_json::to_string(&hit).unwrap();
        let back: SearchHit = serde_json::from_str(&json).unwrap();
        assert_eq!(hit, back);
    }

    #[test]
    fn test_search_response_parsing() {
        let raw = r#"{"hits": [{"item_id": "I1", "description": "Leather tote"}]}"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.hits.len(), 1);
        assert_eq!(parsed.hits[0].item_id, "I1");
    }
}
