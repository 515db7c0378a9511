//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the filesystem store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Keys become file names, so only a restricted alphabet is accepted.
    #[error("invalid state key: {0:?}")]
    InvalidKey(String),

    /// The data directory path exists but is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The atomic rename of a freshly written state file failed.
    #[error("failed to persist {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
