//! LLM answer generation module
//!
//! Single-shot (non-streaming) completions from a hosted generative model.
//! One attempt per user request; no retry policy.

pub mod client;

pub use client::GeminiClient;

use crate::errors::Result;

/// Opaque text-completion boundary
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the given prompt
    async fn generate(&self, prompt: &str) -> Result<String>;
}
