//! Context assembly from retrieved index matches

use tracing::debug;

use crate::vector_index::IndexMatch;

/// Assembler for creating a context block from index matches.
///
/// Matches are formatted in index-returned order with no re-ranking,
/// deduplication, or relevance thresholding; the index's own ranking is
/// trusted as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Assemble a context block from index matches.
    ///
    /// Each match is rendered as `"<text> (source: <source>)"` with a literal
    /// `unknown` label when the source field is absent; formatted matches are
    /// joined by blank lines. A match without a text field carries nothing to
    /// ground on and is skipped. An empty match set yields an empty string,
    /// which is a valid (ungrounded) context.
    #[must_use]
    pub fn assemble(&self, matches: &[IndexMatch]) -> String {
        let mut pieces = Vec::with_capacity(matches.len());

        for m in matches {
            let Some(text) = m.text.as_deref() else {
                debug!("Skipping index match without text metadata");
                continue;
            };
            let source = m.source.as_deref().unwrap_or("unknown");
            pieces.push(format!("{text} (source: {source})"));
        }

        pieces.join("\n\n")
    }
}
