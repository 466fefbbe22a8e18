//! Retrieval of ranked context via embedding similarity search

use std::sync::Arc;

use tracing::debug;

use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::rag::ContextAssembler;
use crate::vector_index::VectorIndex;

/// Retriever turning a raw question into a ranked textual context
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    assembler: ContextAssembler,
    query_prefix: String,
    top_k: usize,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        query_prefix: String,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            assembler: ContextAssembler::new(),
            query_prefix,
            top_k,
        }
    }

    /// Retrieve a context block for the query.
    ///
    /// The query is prefixed with the corpus's instruction marker before
    /// embedding; the embedded vector is then used for a top-K lookup and the
    /// matches flattened into a single annotated context string. Zero matches
    /// yield an empty context, not an error.
    ///
    /// # Errors
    /// - Embedding generation failures
    /// - Vector index query failures
    pub async fn retrieve(&self, query: &str) -> Result<String> {
        debug!("Retrieving context for query: {}", query);

        let formatted_query = format!("{}{}", self.query_prefix, query);
        let query_embedding = self.embedder.embed(&formatted_query).await?;

        let matches = self.index.query(&query_embedding, self.top_k).await?;
        debug!("Retrieved {} matches", matches.len());

        Ok(self.assembler.assemble(&matches))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::vector_index::IndexMatch;

    struct RecordingEmbedder {
        seen: Mutex<Option<String>>,
    }

    #[async_trait]
    impl Embedder for RecordingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            *self.seen.lock().unwrap() = Some(text.to_string());
            Ok(vec![0.1, 0.2, 0.3])
        }
    }

    struct StaticIndex {
        matches: Vec<IndexMatch>,
    }

    #[async_trait]
    impl VectorIndex for StaticIndex {
        async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<IndexMatch>> {
            Ok(self.matches.clone())
        }
    }

    #[tokio::test]
    async fn test_retrieve_applies_query_prefix() {
        let embedder = Arc::new(RecordingEmbedder {
            seen: Mutex::new(None),
        });
        let index = Arc::new(StaticIndex { matches: vec![] });

        let retriever = Retriever::new(
            embedder.clone(),
            index,
            "query: ".to_string(),
            20,
        );
        retriever.retrieve("What is the lockout procedure?").await.unwrap();

        assert_eq!(
            embedder.seen.lock().unwrap().as_deref(),
            Some("query: What is the lockout procedure?")
        );
    }

    #[tokio::test]
    async fn test_retrieve_zero_matches_yields_empty_context() {
        let embedder = Arc::new(RecordingEmbedder {
            seen: Mutex::new(None),
        });
        let index = Arc::new(StaticIndex { matches: vec![] });

        let retriever = Retriever::new(embedder, index, "query: ".to_string(), 20);
        let context = retriever.retrieve("anything").await.unwrap();

        assert_eq!(context, "");
    }

    #[tokio::test]
    async fn test_retrieve_formats_matches_in_order() {
        let embedder = Arc::new(RecordingEmbedder {
            seen: Mutex::new(None),
        });
        let index = Arc::new(StaticIndex {
            matches: vec![
                IndexMatch {
                    text: Some("Lock all valves".to_string()),
                    source: Some("doc1".to_string()),
                    score: 0.9,
                },
                IndexMatch {
                    text: Some("Notify supervisor".to_string()),
                    source: Some("doc2".to_string()),
                    score: 0.8,
                },
            ],
        });

        let retriever = Retriever::new(embedder, index, "query: ".to_string(), 20);
        let context = retriever.retrieve("lockout").await.unwrap();

        assert_eq!(
            context,
            "Lock all valves (source: doc1)\n\nNotify supervisor (source: doc2)"
        );
    }
}
