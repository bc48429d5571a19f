/// One chat session: the pipeline stages and the vector index they share.
///
/// A session is built at start-up, replaced on reset, and dropped with the
/// server. Dropping it discards the index.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::document::chunker::{ChunkConfigError, Chunker};
use crate::document::pdf;
use crate::embedder::Embedder;
use crate::embedder::ollama::OllamaEmbedder;
use crate::error::{PipelineError, Result};
use crate::generator::ollama::OllamaLlm;
use crate::generator::{AnswerGenerator, LanguageModel};
use crate::index::{SearchResult, VectorIndex};
use crate::intake::FileIntake;

/// Outcome of indexing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub path: PathBuf,
    pub name: String,
    pub pages: usize,
    pub chunks: usize,
}

/// A generated answer and the chunks it was generated from.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SearchResult>,
}

pub struct Session {
    intake: FileIntake,
    chunker: Chunker,
    index: VectorIndex,
    generator: AnswerGenerator,
    top_k: usize,
    documents: Vec<IngestReport>,
}

impl Session {
    /// Build a session from `config` around the given model handles.
    pub fn new(
        config: &Config,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn LanguageModel>,
    ) -> std::result::Result<Self, ChunkConfigError> {
        Ok(Self {
            intake: FileIntake::new(config.storage_dir.clone()),
            chunker: Chunker::new(config.chunk_size, config.chunk_overlap)?,
            index: VectorIndex::new(embedder),
            generator: AnswerGenerator::new(model),
            top_k: config.search_top_k,
            documents: Vec::new(),
        })
    }

    /// Ollama-backed model handles described by `config`.
    pub fn ollama_models(
        config: &Config,
    ) -> anyhow::Result<(Arc<dyn Embedder>, Arc<dyn LanguageModel>)> {
        let timeout = config.request_timeout();
        let embedder =
            OllamaEmbedder::new(&config.ollama.base_url, &config.model.embedding, timeout)?;
        let llm = OllamaLlm::new(&config.ollama.base_url, &config.model.language, timeout)?;
        info!(
            "Using Ollama at {} (embedding: {}, language: {})",
            config.ollama.base_url,
            embedder.model(),
            llm.model()
        );
        Ok((Arc::new(embedder), Arc::new(llm)))
    }

    /// Store an upload, then load, chunk and index it.
    pub fn ingest(&mut self, filename: &str, bytes: &[u8]) -> Result<IngestReport> {
        let path = self.intake.save(filename, bytes)?;
        self.ingest_path(&path)
    }

    /// Load, chunk and index a PDF already on disk.
    ///
    /// The index is untouched unless every chunk was embedded.
    pub fn ingest_path(&mut self, path: &Path) -> Result<IngestReport> {
        let document = pdf::load_pdf(path).inspect_err(|e| warn!("{e}"))?;
        let chunks = self.chunker.chunk_document(&document);
        self.index.add(&chunks).inspect_err(|e| warn!("{e}"))?;

        let report = IngestReport {
            path: document.path.clone(),
            name: document.display_name(),
            pages: document.total_pages(),
            chunks: chunks.len(),
        };
        info!(
            "Processed {}: {} pages, {} chunks",
            report.name, report.pages, report.chunks
        );
        self.documents.push(report.clone());
        Ok(report)
    }

    /// Chunks most relevant to `query`, at most `search_top_k` of them.
    pub fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(PipelineError::EmptyQuery);
        }
        if self.index.is_empty() {
            return Err(PipelineError::NoDocument);
        }
        Ok(self.index.search(query, self.top_k)?)
    }

    /// Retrieve context for `query` and generate an answer from it.
    pub fn ask(&self, query: &str) -> Result<Answer> {
        let sources = self.retrieve(query)?;
        let text = self
            .generator
            .generate(query, &sources)
            .inspect_err(|e| warn!("{e}"))?;
        Ok(Answer { text, sources })
    }

    /// Documents indexed in this session, oldest first.
    pub fn documents(&self) -> &[IngestReport] {
        &self.documents
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn storage_dir(&self) -> &Path {
        self.intake.storage_dir()
    }
}
