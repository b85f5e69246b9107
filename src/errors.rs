//! Shared error types used across submodules.

use thiserror::Error;

use crate::math::Scalar;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum HarmonicsError {
    /// Raised when sweep, sampling or statistics parameters are invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Raised when the site impedance exactly cancels a network impedance.
    #[error("division singularity: site impedance cancels network impedance {r} + j{x} Ω")]
    DivisionSingularity {
        /// Network resistance at the singular point.
        r: Scalar,
        /// Network reactance at the singular point.
        x: Scalar,
    },
    /// Raised when polygon vertices do not describe a usable simple polygon.
    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),
    /// Raised when polygon input data cannot be interpreted.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// Raised when the interior sampler runs out of attempts.
    #[error(
        "sampling exhausted after {attempts} attempts: accepted {accepted} of {requested} points"
    )]
    SamplingExhausted {
        /// Candidate points drawn.
        attempts: usize,
        /// Candidate points accepted before giving up.
        accepted: usize,
        /// Points requested.
        requested: usize,
    },
    /// Wraps file system failures while reading input or writing artifacts.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, HarmonicsError>;
