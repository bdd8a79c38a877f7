//! Unified error types for the dome controller.
//!
//! The error surface is narrow: everything that can go wrong is caught at
//! construction or run-start time.  Once a run is accepted the per-step path
//! is infallible; sensor excursions are reported as alerts, never as errors.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A PID controller was built with `output_min > output_max` (or a
    /// non-finite bound).
    InvalidBounds { min: f64, max: f64 },
    /// A run was requested with an unusable duration or step size.
    InvalidRun(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
    /// A configuration store could not be read or written.
    Storage(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBounds { min, max } => {
                write!(f, "invalid controller bounds: min {min} > max {max}")
            }
            Self::InvalidRun(msg) => write!(f, "invalid run: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Storage(msg) => write!(f, "storage: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<crate::app::ports::ConfigError> for Error {
    fn from(e: crate::app::ports::ConfigError) -> Self {
        use crate::app::ports::ConfigError;
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::NotFound => Self::Storage("config not found"),
            ConfigError::Corrupted => Self::Storage("config corrupted"),
            ConfigError::IoError => Self::Storage("I/O error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
