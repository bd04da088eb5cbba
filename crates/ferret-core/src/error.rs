//! Error types for ferret core operations.
//!
//! Library-level errors use `thiserror`; the backend trait seam and the CLI
//! use `anyhow` for convenient propagation.

use thiserror::Error;

/// Result type alias using FerretError
pub type Result<T> = std::result::Result<T, FerretError>;

/// Core error types for ferret operations.
#[derive(Error, Debug)]
pub enum FerretError {
    /// Invalid search pattern (e.g., bad regex)
    #[error("invalid search pattern: {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// No ready NTFS volume matched the requested filter
    #[error("no eligible volume: {reason}")]
    NoEligibleVolume { reason: String },

    /// The process lacks the privileges required to open raw volumes
    #[error("administrator privileges are required to read the MFT")]
    NotAdministrator,
}

impl FerretError {
    /// Create an invalid-pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        FerretError::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create a no-eligible-volume error
    pub fn no_eligible_volume(reason: impl Into<String>) -> Self {
        FerretError::NoEligibleVolume {
            reason: reason.into(),
        }
    }
}
