use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    /// The file exists but cannot be turned back into credentials: bad JSON,
    /// the wrong protection mode, a wrong key or tampered ciphertext.
    #[error("Session cache {} is corrupted: {reason}", path.display())]
    Corrupted { path: PathBuf, reason: String },

    #[error("Failed to {operation} {}: {source}", path.display())]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode session cache: {0}")]
    Encode(String),

    #[error("Invalid cache key: {0}")]
    InvalidKey(String),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            operation,
            source,
        }
    }
}
