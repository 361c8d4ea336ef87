//! Error types for the BMI adapter.

use roms_dataset::DatasetError;
use thiserror::Error;

/// Result type for BMI operations.
pub type BmiResult<T> = Result<T, BmiError>;

/// Errors surfaced to the orchestration caller.
#[derive(Error, Debug)]
pub enum BmiError {
    /// The dataset could not be read.
    #[error("dataset source unavailable: {0}")]
    SourceUnavailable(String),

    /// The dataset lacks the required dimensions or conventions.
    #[error("incompatible dataset format: {0}")]
    IncompatibleFormat(String),

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("unknown grid: {0}")]
    UnknownGrid(usize),

    /// Caller buffer has the wrong length; nothing was written.
    #[error("buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// A flat index is outside the variable's grid.
    #[error("index {index} out of range for grid of {size} nodes")]
    IndexOutOfRange { index: usize, size: usize },

    /// Advance requested past the last time step; the cursor is unchanged.
    #[error("end of data: step {step} is the last of {total}")]
    EndOfData { step: usize, total: usize },

    /// Query before `initialize()` or after `finalize()`.
    #[error("model is not initialized")]
    NotInitialized,

    /// Lifecycle call not allowed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Configuration file unreadable or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Any other catalog failure (reads from an opened store).
    #[error("dataset error: {0}")]
    Dataset(String),
}

/// Payload-free error classification for branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BmiErrorKind {
    SourceUnavailable,
    IncompatibleFormat,
    UnknownVariable,
    UnknownDimension,
    UnknownGrid,
    BufferSizeMismatch,
    IndexOutOfRange,
    EndOfData,
    NotInitialized,
    InvalidState,
    Config,
    Dataset,
}

impl BmiError {
    pub fn kind(&self) -> BmiErrorKind {
        match self {
            Self::SourceUnavailable(_) => BmiErrorKind::SourceUnavailable,
            Self::IncompatibleFormat(_) => BmiErrorKind::IncompatibleFormat,
            Self::UnknownVariable(_) => BmiErrorKind::UnknownVariable,
            Self::UnknownDimension(_) => BmiErrorKind::UnknownDimension,
            Self::UnknownGrid(_) => BmiErrorKind::UnknownGrid,
            Self::BufferSizeMismatch { .. } => BmiErrorKind::BufferSizeMismatch,
            Self::IndexOutOfRange { .. } => BmiErrorKind::IndexOutOfRange,
            Self::EndOfData { .. } => BmiErrorKind::EndOfData,
            Self::NotInitialized => BmiErrorKind::NotInitialized,
            Self::InvalidState(_) => BmiErrorKind::InvalidState,
            Self::Config(_) => BmiErrorKind::Config,
            Self::Dataset(_) => BmiErrorKind::Dataset,
        }
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an InvalidState error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}

impl From<DatasetError> for BmiError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::SourceUnavailable(msg) => Self::SourceUnavailable(msg),
            DatasetError::IncompatibleFormat(msg) => Self::IncompatibleFormat(msg),
            DatasetError::UnknownVariable(name) => Self::UnknownVariable(name),
            DatasetError::UnknownDimension(name) => Self::UnknownDimension(name),
            DatasetError::Closed => Self::NotInitialized,
            other @ DatasetError::Download { .. } => Self::SourceUnavailable(other.to_string()),
            other @ DatasetError::Read { .. } => Self::Dataset(other.to_string()),
        }
    }
}

impl From<serde_yaml::Error> for BmiError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(format!("YAML error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_error_mapping() {
        let err: BmiError = DatasetError::UnknownVariable("temp".to_string()).into();
        assert_eq!(err.kind(), BmiErrorKind::UnknownVariable);

        let err: BmiError = DatasetError::incompatible("no temporal dimension").into();
        assert_eq!(err.kind(), BmiErrorKind::IncompatibleFormat);

        let err: BmiError = DatasetError::Closed.into();
        assert_eq!(err.kind(), BmiErrorKind::NotInitialized);

        let err: BmiError = DatasetError::download("https://host/roms_avg.nc", "404").into();
        assert_eq!(err.kind(), BmiErrorKind::SourceUnavailable);
        assert!(err.to_string().contains("roms_avg.nc"));

        let err: BmiError = DatasetError::read("salt", "HDF error").into();
        assert_eq!(err.kind(), BmiErrorKind::Dataset);
        assert!(err.to_string().contains("salt"));
    }

    #[test]
    fn test_error_messages() {
        let err = BmiError::BufferSizeMismatch {
            expected: 25652,
            actual: 10,
        };
        assert_eq!(
            err.to_string(),
            "buffer size mismatch: expected 25652 elements, got 10"
        );
        assert_eq!(BmiError::NotInitialized.to_string(), "model is not initialized");
    }
}
