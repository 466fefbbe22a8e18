//! Complete RAG pipeline: Retrieve -> Compose -> Generate

use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::config::AppConfig;
use crate::embeddings::EmbeddingClient;
use crate::errors::Result;
use crate::llm::GeminiClient;
use crate::llm::TextGenerator;
use crate::rag::prompts;
use crate::rag::Retriever;
use crate::vector_index::PineconeClient;

/// Complete RAG service
pub struct RagService {
    retriever: Retriever,
    generator: Arc<dyn TextGenerator>,
}

impl RagService {
    /// Create a service wired to the hosted providers from the config
    ///
    /// # Errors
    /// - Embedding client configuration errors (unknown provider, bad endpoint)
    /// - Vector index or LLM client configuration errors
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let embedder = Arc::new(EmbeddingClient::from_config(&config.embeddings)?);
        let index = Arc::new(PineconeClient::from_config(&config.vector_index)?);
        let generator = Arc::new(GeminiClient::from_config(&config.llm)?);

        let retriever = Retriever::new(
            embedder,
            index,
            config.embeddings.query_prefix.clone(),
            config.vector_index.top_k,
        );

        Ok(Self {
            retriever,
            generator,
        })
    }

    /// Create from existing services
    #[must_use]
    pub fn from_services(retriever: Retriever, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Perform a complete RAG query.
    ///
    /// Generation is attempted even when retrieval produced an empty context;
    /// the model then answers ungrounded rather than the request being
    /// skipped.
    ///
    /// # Errors
    /// - Retrieval failures (embedding generation, index queries)
    /// - Generation failures (API errors, quota, timeouts, empty responses)
    pub async fn query(&self, question: &str) -> Result<RagResponse> {
        info!("Processing RAG query: {}", question);

        debug!("Step 1: Retrieving context");
        let context = self.retriever.retrieve(question).await?;

        debug!("Step 2: Composing prompt");
        let prompt = prompts::build_answer_prompt(&context, question);

        debug!("Step 3: Generating answer");
        let answer = self.generator.generate(&prompt).await?;

        info!("RAG query completed successfully");

        Ok(RagResponse {
            answer,
            context,
            query: question.to_string(),
        })
    }
}

/// RAG response
#[derive(Debug, Clone)]
pub struct RagResponse {
    pub answer: String,
    pub context: String,
    pub query: String,
}
