//! Gemini REST client for answer generation

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::LlmConfig;
use crate::errors::GuideChatError;
use crate::errors::Result;
use crate::llm::TextGenerator;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Extract the completion text from a response. A response without candidate
/// text (safety block, exhausted quota reported as an empty body) counts as a
/// generation failure.
fn extract_text(response: GenerateResponse) -> Result<String> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(GuideChatError::Generation(
            "Model returned no candidate text".to_string(),
        ));
    }

    Ok(text)
}

/// Client for the Gemini `generateContent` API
pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
    client: Client,
}

impl GeminiClient {
    /// Create a new generation client with a pinned model identifier
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        temperature: Option<f32>,
        max_output_tokens: Option<u32>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GuideChatError::Http(e.to_string()))?;

        Ok(Self {
            endpoint,
            api_key,
            model,
            temperature,
            max_output_tokens,
            client,
        })
    }

    /// Create a client from the application config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            config.model.clone(),
            config.temperature,
            config.max_output_tokens,
            config.timeout_secs,
        )
    }

    /// Model identifier this client is pinned to
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        );
        debug!("Calling generation API: model {}", self.model);

        let generation_config = if self.temperature.is_some() || self.max_output_tokens.is_some() {
            Some(GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            })
        } else {
            None
        };

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GuideChatError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GuideChatError::Generation(format!(
                "Generation API error ({status}): {error_text}"
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GuideChatError::Generation(format!("Failed to parse response: {e}")))?;

        extract_text(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "Lock the"}, {"text": " valves."}]}}]}"#,
        )
        .unwrap();

        assert_eq!(extract_text(response).unwrap(), "Lock the valves.");
    }

    #[test]
    fn test_extract_text_empty_candidates_is_failure() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(extract_text(response).is_err());
    }

    #[test]
    fn test_extract_text_missing_content_is_failure() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{}]}"#).unwrap();
        assert!(extract_text(response).is_err());
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_generate_live() {
        let client = GeminiClient::new(
            "https://generativelanguage.googleapis.com".to_string(),
            std::env::var("GOOGLE_API_KEY").unwrap_or_default(),
            "gemini-1.5-flash".to_string(),
            None,
            None,
            120,
        )
        .unwrap();

        let answer = client.generate("Say hello in one word.").await.unwrap();
        assert!(!answer.is_empty());
    }
}
