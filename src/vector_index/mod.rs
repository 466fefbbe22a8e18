//! Vector index boundary
//!
//! Nearest-neighbor lookups against a hosted vector index. The corpus is
//! assumed to be already ingested; this module only issues top-K queries.

pub mod client;

pub use client::PineconeClient;

use crate::errors::Result;

/// A single nearest-neighbor match as returned by the index. Metadata fields
/// are optional because the index does not guarantee their presence.
#[derive(Debug, Clone)]
pub struct IndexMatch {
    pub text: Option<String>,
    pub source: Option<String>,
    pub score: f32,
}

/// Opaque nearest-neighbor service. Matches are returned in the index's own
/// ranking order (descending similarity); callers must not re-rank.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Query the index for the `top_k` nearest vectors, with metadata
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>>;
}
