//! Error handling for the iqsync library
//!
//! Every failure of the capture loader and the delay estimator is reported as
//! a value of this type. Nothing in this crate logs or prints on the failure
//! path; hosts decide how errors reach the user.

use thiserror::Error;

/// A specialized Result type for iqsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for iqsync operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Raw channel block is empty or has an odd number of bytes
    #[error("Invalid capture: {0}")]
    InvalidCapture(String),

    /// Reference and candidate sequences differ in length
    #[error("Dimension mismatch: reference has {reference} samples, candidate has {candidate}")]
    DimensionMismatch { reference: usize, candidate: usize },

    /// Analysis window of zero samples
    #[error("Empty input: analysis length is zero")]
    EmptyInput,
}

impl Error {
    /// Create an invalid capture error with a custom message
    pub fn invalid_capture<S: Into<String>>(msg: S) -> Self {
        Error::InvalidCapture(msg.into())
    }

    /// Create a dimension mismatch error from the two sequence lengths
    pub fn dimension_mismatch(reference: usize, candidate: usize) -> Self {
        Error::DimensionMismatch {
            reference,
            candidate,
        }
    }
}
