use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading a reference catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file does not exist.
    #[error("reference file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read reference file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data line did not have the expected shape.
    #[error("malformed record in {} at line {line}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}
