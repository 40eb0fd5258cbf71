//! Error taxonomy for the conversion pipeline
//!
//! Configuration and missing-parameter errors are fatal before any file is
//! touched. Everything else is isolated per source file by the batch driver,
//! except filesystem errors hit while enumerating a batch, which abort it.

use std::path::PathBuf;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur during conversion
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("channel index {index} is out of range, file has {count} channels (valid: 0..{count})")]
    OutOfRange { index: usize, count: usize },

    #[error("channel {label:?} has {actual} samples but {expected} were expected for a rectangular output")]
    ShapeMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("no channels found in source file {0:?}")]
    EmptySource(PathBuf),

    #[error("decode error: {0}")]
    Decode(#[from] tdms_decoder::TdmsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write output: {0}")]
    Write(String),
}

impl ConvertError {
    /// True for errors that must stop the run before any file is processed
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ConvertError::Configuration(_) | ConvertError::MissingParameter(_)
        )
    }
}
