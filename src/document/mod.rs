//! Documents, their pages, and the chunks cut from them.
pub mod chunker;
pub mod pdf;

use std::path::{Path, PathBuf};

/// One page of extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number within the source file.
    pub number: u32,
    pub text: String,
}

/// A loaded document: the file it came from and its pages in order.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub pages: Vec<Page>,
}

impl Document {
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// File name shown to the user.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A bounded window of page text, the unit of retrieval.
///
/// Chunks are immutable once cut; fields are only exposed through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    content: String,
    source: PathBuf,
    page: u32,
    start_index: usize,
    index: usize,
}

impl Chunk {
    pub(crate) fn new(
        content: String,
        source: PathBuf,
        page: u32,
        start_index: usize,
        index: usize,
    ) -> Self {
        Self {
            content,
            source,
            page,
            start_index,
            index,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Page the chunk was cut from (1-based).
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Character offset of the chunk's first character within its page.
    ///
    /// Counted in the page text as loaded, which has leading and trailing
    /// whitespace trimmed, not in the raw extracted text.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Position of the chunk in document order.
    pub fn index(&self) -> usize {
        self.index
    }
}
