//! # pdfqa: Ask questions about a PDF
//!
//! Upload a PDF, have it split into overlapping chunks and embedded into an
//! in-memory vector index, then ask questions answered by a language model
//! from the most relevant chunks.
//!
//! ## Architecture
//!
//! - **[`config`]**: Configuration loading and validation
//! - **[`intake`]**: Storing uploaded files
//! - **[`document`]**: PDF loading and chunking
//! - **[`embedder`]**: Text embedding (Ollama, deterministic mock)
//! - **[`index`]**: In-memory cosine-similarity index
//! - **[`generator`]**: Prompt assembly and answer generation (Ollama)
//! - **[`session`]**: The per-session pipeline context
//! - **[`ui`]**: Browser chat page served with axum

pub mod config;
pub mod document;
pub mod embedder;
pub mod error;
pub mod generator;
pub mod index;
pub mod intake;
pub mod session;
pub mod ui;
