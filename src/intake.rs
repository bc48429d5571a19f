//! Persisting uploaded files.
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("only PDF files are accepted, got {0:?}")]
    NotPdf(String),

    #[error("invalid upload filename {0:?}")]
    InvalidFilename(String),

    #[error("failed to store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes uploads into a single storage directory, one file per name.
#[derive(Debug, Clone)]
pub struct FileIntake {
    storage_dir: PathBuf,
}

impl FileIntake {
    pub fn new<P: Into<PathBuf>>(storage_dir: P) -> Self {
        Self {
            storage_dir: storage_dir.into(),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Store `bytes` under `filename` and return the written path.
    ///
    /// Only the final component of `filename` is used. An existing file with
    /// the same name is overwritten.
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, IntakeError> {
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| IntakeError::InvalidFilename(filename.to_string()))?;

        let is_pdf = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(IntakeError::NotPdf(name.to_string()));
        }

        std::fs::create_dir_all(&self.storage_dir).map_err(|source| IntakeError::Io {
            path: self.storage_dir.clone(),
            source,
        })?;

        let path = self.storage_dir.join(name);
        std::fs::write(&path, bytes).map_err(|source| IntakeError::Io {
            path: path.clone(),
            source,
        })?;

        info!("Stored upload {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}
