//! Loading and saving the persisted raw-text blob.
//!
//! The document is persisted verbatim as a single raw-text file; everything
//! structural is reconstructed from it on load.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a document file and return its raw text.
pub fn load_document(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Write raw text to a document file, creating parent directories as needed.
pub fn save_document(path: &Path, text: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }
    fs::write(path, text).map_err(IoError::Io)
}
