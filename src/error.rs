//! Errors surfaced by the upload and question pipelines.
use thiserror::Error;

use crate::document::pdf::ParseError;
use crate::embedder::EmbedderError;
use crate::generator::GenerationError;
use crate::intake::IntakeError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    EmbeddingService(#[from] EmbedderError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("no document has been indexed yet")]
    NoDocument,

    #[error("query must not be empty")]
    EmptyQuery,
}

impl PipelineError {
    /// Short heading shown above the error message in the chat page.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Intake(_) => "Upload rejected",
            Self::Parse(_) => "Could not read the PDF",
            Self::EmbeddingService(_) => "Embedding service error",
            Self::Generation(_) => "Language model error",
            Self::NoDocument => "No document yet",
            Self::EmptyQuery => "Empty question",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
