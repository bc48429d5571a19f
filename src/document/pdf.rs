/// PDF loading with `lopdf`.
///
/// Produces one [`Page`] per PDF page, in page order, with surrounding
/// whitespace trimmed.
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::{Document, Page};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid PDF: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("failed to extract text from page {page} of {path}: {message}")]
    Extraction {
        path: PathBuf,
        page: u32,
        message: String,
    },

    #[error("{path} contains no extractable text")]
    NoText { path: PathBuf },
}

/// Load the PDF at `path` into a [`Document`].
pub fn load_pdf<P: AsRef<Path>>(path: P) -> Result<Document, ParseError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let doc = lopdf::Document::load_mem(&bytes).map_err(|e| ParseError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut pages = Vec::new();
    for number in doc.get_pages().into_keys() {
        let text = doc
            .extract_text(&[number])
            .map_err(|e| ParseError::Extraction {
                path: path.to_path_buf(),
                page: number,
                message: e.to_string(),
            })?;
        debug!("Page {number}: {} chars", text.chars().count());
        pages.push(Page {
            number,
            text: text.trim().to_string(),
        });
    }

    if pages.iter().all(|p| p.text.is_empty()) {
        return Err(ParseError::NoText {
            path: path.to_path_buf(),
        });
    }

    info!("Loaded {} pages from {}", pages.len(), path.display());
    Ok(Document {
        path: path.to_path_buf(),
        pages,
    })
}
