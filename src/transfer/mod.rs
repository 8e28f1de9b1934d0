//! Card import and export
//!
//! Supports:
//! - JSONL, one card per line (full exported cards or bare `front`/`back`/`subject` objects)
//! - CSV with a `front,back,subject[,tags]` header, tags separated by `;`
//!
//! Unusable lines and rows are skipped and counted, never fatal.

mod export;
mod import;

use std::path::Path;

use thiserror::Error;

use crate::storage::StorageError;

pub use export::*;
pub use import::*;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV file is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("Unsupported file type: {0} (expected .jsonl or .csv)")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, TransferError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFormat {
    Jsonl,
    Csv,
}

impl CardFormat {
    /// Infer the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "jsonl" | "ndjson" | "json" => Ok(CardFormat::Jsonl),
            "csv" => Ok(CardFormat::Csv),
            _ => Err(TransferError::UnsupportedFormat(path.display().to_string())),
        }
    }
}
