//! Pinecone-style REST client for vector index queries

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::VectorIndexConfig;
use crate::errors::GuideChatError;
use crate::errors::Result;
use crate::vector_index::IndexMatch;
use crate::vector_index::VectorIndex;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<MatchMetadata>,
}

#[derive(Deserialize)]
struct MatchMetadata {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

impl From<QueryMatch> for IndexMatch {
    fn from(m: QueryMatch) -> Self {
        let (text, source) = match m.metadata {
            Some(meta) => (meta.text, meta.source),
            None => (None, None),
        };
        Self {
            text,
            source,
            score: m.score,
        }
    }
}

/// Client for a Pinecone-compatible index endpoint
pub struct PineconeClient {
    endpoint: String,
    api_key: String,
    namespace: Option<String>,
    client: Client,
}

impl PineconeClient {
    /// Create a new index client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        endpoint: String,
        api_key: String,
        namespace: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GuideChatError::Http(e.to_string()))?;

        Ok(Self {
            endpoint,
            api_key,
            namespace,
            client,
        })
    }

    /// Create a client from the application config
    pub fn from_config(config: &VectorIndexConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            config.namespace.clone(),
            config.timeout_secs,
        )
    }
}

#[async_trait]
impl VectorIndex for PineconeClient {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>> {
        let url = format!("{}/query", self.endpoint);
        debug!("Querying vector index: {} (top_k: {})", url, top_k);

        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            namespace: self.namespace.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GuideChatError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GuideChatError::VectorIndex(format!(
                "Index query error ({status}): {error_text}"
            )));
        }

        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| GuideChatError::VectorIndex(format!("Failed to parse response: {e}")))?;

        Ok(result.matches.into_iter().map(IndexMatch::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_conversion_preserves_metadata() {
        let raw: QueryResponse = serde_json::from_str(
            r#"{"matches": [
                {"score": 0.92, "metadata": {"text": "Lock all valves", "source": "doc1"}},
                {"score": 0.87, "metadata": {"text": "Notify supervisor"}},
                {"score": 0.41}
            ]}"#,
        )
        .unwrap();

        let matches: Vec<IndexMatch> = raw.matches.into_iter().map(IndexMatch::from).collect();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].text.as_deref(), Some("Lock all valves"));
        assert_eq!(matches[0].source.as_deref(), Some("doc1"));
        assert_eq!(matches[1].source, None);
        assert_eq!(matches[2].text, None);
    }

    #[test]
    fn test_empty_response_yields_no_matches() {
        let raw: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(raw.matches.is_empty());
    }

    #[test]
    fn test_query_request_serialization() {
        let request = QueryRequest {
            vector: &[0.1, 0.2],
            top_k: 20,
            include_metadata: true,
            namespace: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["topK"], 20);
        assert_eq!(json["includeMetadata"], true);
        assert!(json.get("namespace").is_none());
    }
}
