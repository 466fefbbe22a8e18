//! RAG (Retrieval-Augmented Generation) module
//!
//! End-to-end pipeline for answering questions against the indexed guideline
//! corpus:
//! - Semantic retrieval using query embeddings
//! - Context assembly from retrieved matches
//! - Prompt composition
//! - LLM-based answer generation
//!
//! # Examples
//!
//! ```rust,no_run
//! use guidechat::config::AppConfig;
//! use guidechat::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::from_config(&config)?;
//!
//!     let response = service.query("What is the lockout procedure?").await?;
//!     println!("Answer: {}", response.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod pipeline;
pub mod prompts;
pub mod retriever;

pub use context::ContextAssembler;
pub use pipeline::RagResponse;
pub use pipeline::RagService;
pub use retriever::Retriever;
