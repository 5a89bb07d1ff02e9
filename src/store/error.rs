use thiserror::Error;

/// Errors surfaced by the document store and backup operations.
///
/// Storage errors are never retried here; callers decide the user-visible
/// behavior. The store logs failures as a side effect so they stay auditable
/// even when a caller mishandles the result.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input is not valid JSON or does not match the document shape.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Disk read/write/copy/delete failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Referenced snapshot or document does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A restored snapshot's content failed to parse as a document.
    #[error("restored snapshot {filename} is not a valid document: {source}")]
    CorruptSnapshot {
        filename: String,
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Machine-readable error kind for API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Parse(_) => "parse_error",
            StoreError::Io(_) => "io_error",
            StoreError::NotFound(_) => "not_found",
            StoreError::CorruptSnapshot { .. } => "corrupt_snapshot",
        }
    }
}
