// src/error.rs
//
// Error taxonomy shared by every stage of the lab.

use thiserror::Error;

/// Errors raised by the signal pipeline and its I/O boundaries
#[derive(Debug, Error)]
pub enum LabError {
    /// Rates, lengths, cutoffs or parameters outside their valid domain
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Filter design or application produced unstable or non-finite values
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Malformed or unsupported audio container
    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("failed to encode WAV: {0}")]
    Encode(#[from] hound::Error),

    #[error("failed to render plot: {0}")]
    Render(#[from] image::ImageError),

    #[error("failed to draw plot: {0}")]
    Plot(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LabError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn numerical(message: impl Into<String>) -> Self {
        Self::Numerical(message.into())
    }
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, LabError>;
