//! Common error types for ovhdeploy.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why a single object upload was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadFailure {
    /// The storage answered with something other than `201 Created`.
    Status(u16),
    /// The request never produced a response.
    Transport(String),
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadFailure::Status(code) => write!(f, "rejected with status code: {}", code),
            UploadFailure::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

/// Top-level error type for deploy operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The account API returned no storage access token.
    #[error("Could not obtain access token for object storage")]
    Auth,

    /// The project has no storage endpoints at all.
    #[error("There are no available storage endpoints for this project")]
    NoStorage,

    /// No endpoint matches the requested region.
    #[error("Could not find object storage for region `{0}`")]
    RegionNotFound(String),

    /// The account API refused the storage access request.
    #[error("Could not get access for object storage, server responded with status code {0}")]
    AccessDenied(u16),

    /// A single object upload failed, failing the whole deploy.
    #[error("Unable to upload `{path}`: {cause}")]
    Upload {
        /// Relative path of the file that failed.
        path: String,
        /// Status code or transport failure.
        cause: UploadFailure,
    },

    /// A local file could not be opened or read.
    #[error("Cannot read `{}`: {source}", path.display())]
    Filesystem {
        /// Absolute or root-relative path of the local file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// HTTP transport or protocol failure.
    #[error("Network error: {0}")]
    Network(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
