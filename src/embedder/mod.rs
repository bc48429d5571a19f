/// Embedder trait and shared types for text embedding.
pub mod mock;
pub mod ollama;

use thiserror::Error;

/// Errors raised by an embedding backend.
///
/// None of these are retried; they propagate to the caller unchanged.
#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("embedding service unreachable at {endpoint}: {message}")]
    Unreachable { endpoint: String, message: String },

    #[error("embedding request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("embedding service returned {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Trait for text embedding implementations.
///
/// Calls block until the backend answers. All implementations must be
/// `Send + Sync` so the session can hold them behind `Arc`.
pub trait Embedder: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;

    /// Embed multiple text strings into vectors, one per input, in order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError>;
}
