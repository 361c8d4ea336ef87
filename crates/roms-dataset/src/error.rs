//! Error types for dataset catalog operations.

use thiserror::Error;

/// Result type for catalog operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Error types for opening and querying a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The path or URL could not be read.
    #[error("dataset source unavailable: {0}")]
    SourceUnavailable(String),

    /// The store opened but does not follow the expected dimension conventions.
    #[error("incompatible dataset format: {0}")]
    IncompatibleFormat(String),

    /// Variable is not part of the inventory.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// Dimension is not declared by the dataset.
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    /// Reading values from an open store failed.
    #[error("failed to read {name}: {message}")]
    Read { name: String, message: String },

    /// HTTP failure while materialising a local copy.
    #[error("download failed for {url}: {message}")]
    Download { url: String, message: String },

    /// The catalog was closed.
    #[error("dataset is closed")]
    Closed,
}

impl DatasetError {
    /// Create a SourceUnavailable error.
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    /// Create an IncompatibleFormat error.
    pub fn incompatible(msg: impl Into<String>) -> Self {
        Self::IncompatibleFormat(msg.into())
    }

    /// Create a Read error.
    pub fn read(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a Download error.
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        Self::SourceUnavailable(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DatasetError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::IncompatibleFormat(format!("shape mismatch: {}", err))
    }
}
