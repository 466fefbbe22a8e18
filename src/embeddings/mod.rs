//! Embeddings generation module
//!
//! Converts query text into fixed-length vectors using a hosted embedding
//! API. Providers supported:
//! - OpenAI-compatible endpoints (text-embedding-3-small, etc.)
//! - Ollama (local models such as intfloat/e5-base)

pub mod client;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;

use crate::errors::Result;

/// Opaque text-to-vector boundary. The production implementation calls a
/// hosted model; tests substitute a deterministic stub.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
