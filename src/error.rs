//! Error types for chunklog writers.

use std::io;
use std::path::{Path, PathBuf};

/// The result type used throughout chunklog.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for chunklog operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file could not be created, truncated, opened or deleted.
    #[error("File system error on {}: {source}", .path.display())]
    FileSystem {
        /// The path the operation was applied to.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An I/O error occurred while writing record data.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A compression member could not be terminated.
    ///
    /// The writer that produced this error must be discarded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A writer could not be instantiated from the registry.
    #[error("Instantiation error: {0}")]
    Instantiation(String),

    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The writer is in a state that does not allow the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The chunk index could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Creates a new file system error for `path`.
    pub fn file_system(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::FileSystem { path: path.as_ref().to_path_buf(), source }
    }

    /// Creates a new encoding error.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Error::Encoding(msg.into())
    }

    /// Creates a new instantiation error.
    pub fn instantiation(msg: impl Into<String>) -> Self {
        Error::Instantiation(msg.into())
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Creates a new invalid state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
