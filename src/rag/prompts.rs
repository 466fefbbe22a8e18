//! Prompt composition for RAG queries

/// Build the grounded answer prompt.
///
/// Deterministic template: instruction line, context block, question. No
/// truncation is applied here; a prompt exceeding the model's input limit
/// fails in the generation call instead.
pub fn build_answer_prompt(context: &str, question: &str) -> String {
    format!("Use this context to answer the question:\n\n{context}\n\nQuestion: {question}")
}
