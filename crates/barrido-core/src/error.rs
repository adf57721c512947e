//! Error types shared by the signal, analysis and model crates.

use thiserror::Error;

/// Errors that can occur while building or evaluating signals, sweeps and models.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Inconsistent model or pipeline configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A parameter is outside the mathematical domain of an operation.
    #[error("domain error: {0}")]
    Domain(String),

    /// A signal could not be constructed from the given data.
    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    /// Two signals have incompatible channel counts.
    #[error("channel count mismatch: {left} vs {right}")]
    ChannelMismatch {
        /// Channel count of the left operand.
        left: usize,
        /// Channel count of the right operand.
        right: usize,
    },

    /// Two signals must have the same length but do not.
    #[error("length mismatch: {left} vs {right} samples")]
    LengthMismatch {
        /// Length of the left operand.
        left: usize,
        /// Length of the right operand.
        right: usize,
    },

    /// Two signals must share a sampling rate but do not.
    #[error("sampling rate mismatch: {left} Hz vs {right} Hz")]
    SampleRateMismatch {
        /// Sampling rate of the left operand.
        left: f64,
        /// Sampling rate of the right operand.
        right: f64,
    },

    /// A stateful processor was used out of order.
    #[error("invalid state: {0}")]
    State(String),
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a domain error.
    pub fn domain(msg: impl Into<String>) -> Self {
        Error::Domain(msg.into())
    }

    /// Create a state error.
    pub fn state(msg: impl Into<String>) -> Self {
        Error::State(msg.into())
    }
}

/// Convenience result type for barrido operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_display() {
        let err = Error::configuration("2 nonlinear functions but 3 filters");
        assert_eq!(
            err.to_string(),
            "configuration error: 2 nonlinear functions but 3 filters"
        );
    }

    #[test]
    fn mismatch_display() {
        let err = Error::LengthMismatch { left: 4, right: 8 };
        assert_eq!(err.to_string(), "length mismatch: 4 vs 8 samples");

        let err = Error::SampleRateMismatch {
            left: 44100.0,
            right: 48000.0,
        };
        assert!(err.to_string().contains("44100"), "got: {err}");
    }

    #[test]
    fn factories_produce_correct_variant() {
        assert!(matches!(Error::domain("x"), Error::Domain(_)));
        assert!(matches!(Error::state("x"), Error::State(_)));
    }
}
