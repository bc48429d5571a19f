//! Prompt assembly and answer generation.
pub mod ollama;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::index::SearchResult;

/// Separator placed between retrieved chunk texts in the context.
const CONTEXT_SEPARATOR: &str = "\n\n";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("language model unreachable at {endpoint}: {message}")]
    Unreachable { endpoint: String, message: String },

    #[error("language model request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("language model returned {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("invalid language model response: {0}")]
    InvalidResponse(String),
}

/// A text completion backend.
pub trait LanguageModel: Send + Sync {
    /// Send `prompt` as a single completion request and return the raw text.
    fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Fill the instructional template with a query and the retrieved context.
///
/// Values are inserted verbatim; placeholder-like text inside them is left alone.
#[must_use]
pub fn build_prompt(user_query: &str, context: &[SearchResult]) -> String {
    let document_context = context
        .iter()
        .map(|r| r.chunk.content())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);
    format!(
        "You are an expert research assistant. Use the provided context to answer the query.
If unsure, state that you don't know. Be concise and factual (max 3 sentences).

Query: {user_query}
Context: {document_context}
Answer:
"
    )
}

/// Answers one query at a time; nothing from earlier turns is carried over.
#[derive(Clone)]
pub struct AnswerGenerator {
    model: Arc<dyn LanguageModel>,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Generate an answer, returned exactly as the model produced it.
    pub fn generate(
        &self,
        user_query: &str,
        context: &[SearchResult],
    ) -> Result<String, GenerationError> {
        let prompt = build_prompt(user_query, context);
        info!(
            "Generating answer from {} chunks ({} prompt chars)",
            context.len(),
            prompt.chars().count()
        );
        self.model.complete(&prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Chunk;
    use std::path::PathBuf;
    use std::sync::Mutex;

    fn result(index: usize, text: &str) -> SearchResult {
        SearchResult {
            chunk: Chunk::new(text.to_string(), PathBuf::from("d.pdf"), 1, 0, index),
            similarity: 1.0,
        }
    }

    #[derive(Default)]
    struct RecordingModel {
        prompts: Mutex<Vec<String>>,
    }

    impl LanguageModel for RecordingModel {
        fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("  <think>hmm</think> Blue.\n".to_string())
        }
    }

    struct DownModel;

    impl LanguageModel for DownModel {
        fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Timeout {
                endpoint: "http://localhost:11434/api/generate".to_string(),
            })
        }
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt(
            "What color is the sky?",
            &[result(0, "The sky is blue."), result(1, "Grass is green.")],
        );
        assert!(prompt.starts_with("You are an expert research assistant."));
        assert!(prompt.contains("max 3 sentences"));
        assert!(prompt.contains("state that you don't know"));
        assert!(prompt.contains("Query: What color is the sky?\n"));
        assert!(prompt.contains("Context: The sky is blue.\n\nGrass is green.\n"));
        assert!(prompt.ends_with("Answer:\n"));
    }

    #[test]
    fn test_context_keeps_retrieval_order() {
        let prompt = build_prompt("q", &[result(5, "second"), result(1, "first")]);
        assert!(prompt.find("second").unwrap() < prompt.find("first").unwrap());
    }

    #[test]
    fn test_placeholders_in_query_are_not_expanded() {
        let prompt = build_prompt("{document_context}?", &[result(0, "ctx")]);
        assert!(prompt.contains("Query: {document_context}?"));
        let prompt = build_prompt("q", &[result(0, "literal {user_query}")]);
        assert!(prompt.contains("Context: literal {user_query}"));
    }

    #[test]
    fn test_generate_returns_raw_response() {
        let model = Arc::new(RecordingModel::default());
        let generator = AnswerGenerator::new(model.clone());
        let answer = generator
            .generate("What color is the sky?", &[result(0, "The sky is blue.")])
            .unwrap();
        assert_eq!(answer, "  <think>hmm</think> Blue.\n");

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("The sky is blue."));
    }

    #[test]
    fn test_queries_are_independent() {
        let model = Arc::new(RecordingModel::default());
        let generator = AnswerGenerator::new(model.clone());
        generator.generate("first question", &[]).unwrap();
        generator.generate("second question", &[]).unwrap();

        let prompts = model.prompts.lock().unwrap();
        assert!(!prompts[1].contains("first question"));
    }

    #[test]
    fn test_generation_error_propagates() {
        let generator = AnswerGenerator::new(Arc::new(DownModel));
        let err = generator.generate("q", &[]).unwrap_err();
        assert!(matches!(err, GenerationError::Timeout { .. }));
    }
}
