//! Embedding API clients for various providers

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::EmbeddingsConfig;
use crate::embeddings::Embedder;
use crate::errors::GuideChatError;
use crate::errors::Result;

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// `OpenAI`-compatible embeddings API
    OpenAI,
    /// Ollama local embeddings
    Ollama,
}

/// Client for generating embeddings from a hosted provider
pub struct EmbeddingClient {
    provider: EmbeddingProvider,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        provider: EmbeddingProvider,
        model: String,
        endpoint: String,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GuideChatError::Http(e.to_string()))?;

        Ok(Self {
            provider,
            model,
            endpoint,
            api_key,
            client,
        })
    }

    /// Create a client from the application config
    ///
    /// # Errors
    /// - Unknown provider name
    /// - HTTP client build errors
    pub fn from_config(config: &EmbeddingsConfig) -> Result<Self> {
        let provider = match config.provider.as_str() {
            "openai" => EmbeddingProvider::OpenAI,
            "ollama" => EmbeddingProvider::Ollama,
            other => {
                return Err(GuideChatError::Config(format!(
                    "Unknown embedding provider: {other}"
                )))
            }
        };

        Self::new(
            provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
            config.timeout_secs,
        )
    }

    /// Generate embedding using `OpenAI` API
    async fn generate_openai(&self, text: &str) -> Result<Vec<f32>> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            GuideChatError::Config("OpenAI embeddings API key not provided".to_string())
        })?;

        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            input: &'a str,
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let url = format!("{}/embeddings", self.endpoint);
        debug!("Calling OpenAI embeddings API: {}", url);

        let request = OpenAIRequest {
            input: text,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
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
            return Err(GuideChatError::Embedding(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let result: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| GuideChatError::Embedding(format!("Failed to parse response: {e}")))?;

        result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| GuideChatError::Embedding("No embedding in response".to_string()))
    }

    /// Generate embedding using Ollama API
    async fn generate_ollama(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.endpoint);
        debug!("Calling Ollama embeddings API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
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
            return Err(GuideChatError::Embedding(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| GuideChatError::Embedding(format!("Failed to parse response: {e}")))?;

        Ok(result.embedding)
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    /// Generate embedding for a single text
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON, missing embedding data)
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self.provider {
            EmbeddingProvider::OpenAI => self.generate_openai(text).await,
            EmbeddingProvider::Ollama => self.generate_ollama(text).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_rejected() {
        let config = EmbeddingsConfig {
            provider: "sbert".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            model: "intfloat/e5-base".to_string(),
            api_key: None,
            query_prefix: "query: ".to_string(),
            timeout_secs: 30,
        };

        assert!(EmbeddingClient::from_config(&config).is_err());
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_openai_embedding() {
        let client = EmbeddingClient::new(
            EmbeddingProvider::OpenAI,
            "text-embedding-3-small".to_string(),
            "https://api.openai.com/v1".to_string(),
            std::env::var("OPENAI_API_KEY").ok(),
            30,
        )
        .unwrap();

        let embedding = client.embed("Hello, world!").await.unwrap();
        assert_eq!(embedding.len(), 1536);
    }
}
