//! Sweep and model configuration validation.
//!
//! Validation checks every field and reports all problems at once: a single
//! failure comes back as itself, several as [`ValidationError::Multiple`].
//!
//! # Example
//!
//! ```rust
//! use barrido_config::{SweepConfig, ValidationError, validate_sweep};
//!
//! let mut sweep = SweepConfig::default();
//! validate_sweep(&sweep).expect("defaults are valid");
//!
//! sweep.stop_frequency = 10.0;
//! assert!(matches!(
//!     validate_sweep(&sweep),
//!     Err(ValidationError::FrequencyOrder { .. })
//! ));
//! ```

use thiserror::Error;

use crate::model::{FilterConfig, ModelConfig};
use crate::sweep::SweepConfig;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A quantity that must be finite and strictly positive is not.
    #[error("'{param}' must be finite and positive, got {value}")]
    NotPositive {
        /// Name of the field.
        param: String,
        /// The rejected value.
        value: f64,
    },

    /// A duration that must be finite and non-negative is not.
    #[error("'{param}' must be finite and non-negative, got {value}")]
    Negative {
        /// Name of the field.
        param: String,
        /// The rejected value.
        value: f64,
    },

    /// The stop frequency does not lie above the start frequency.
    #[error("stop frequency {stop} Hz must be above start frequency {start} Hz")]
    FrequencyOrder {
        /// Start frequency in Hz.
        start: f64,
        /// Stop frequency in Hz.
        stop: f64,
    },

    /// The stop frequency lies above the Nyquist frequency.
    #[error("stop frequency {stop} Hz exceeds the Nyquist frequency {nyquist} Hz")]
    AboveNyquist {
        /// Stop frequency in Hz.
        stop: f64,
        /// Half the sampling rate.
        nyquist: f64,
    },

    /// Both `duration_secs` and `approximate_length` were given.
    #[error("give either 'duration_secs' or 'approximate_length', not both")]
    ConflictingLength,

    /// The target length is zero samples.
    #[error("sweep length must be at least one sample")]
    ZeroLength,

    /// A model without branches.
    #[error("a model needs at least one branch")]
    NoBranches,

    /// A branch with a power degree of zero.
    #[error("branch {branch}: power degree must be at least 1")]
    InvalidDegree {
        /// Branch index.
        branch: usize,
    },

    /// A generated filter of zero samples.
    #[error("branch {branch}: filter length must be at least one sample")]
    EmptyFilter {
        /// Branch index.
        branch: usize,
    },

    /// A delay filter whose delay does not fit in its length.
    #[error("branch {branch}: delay of {samples} samples does not fit in {length} samples")]
    DelayOutOfRange {
        /// Branch index.
        branch: usize,
        /// Requested delay.
        samples: usize,
        /// Filter length.
        length: usize,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_positive(errors: &mut Vec<ValidationError>, param: &str, value: f64) -> bool {
    let ok = value.is_finite() && value > 0.0;
    if !ok {
        errors.push(ValidationError::NotPositive {
            param: param.to_string(),
            value,
        });
    }
    ok
}

fn check_non_negative(errors: &mut Vec<ValidationError>, param: &str, value: f64) {
    if !(value.is_finite() && value >= 0.0) {
        errors.push(ValidationError::Negative {
            param: param.to_string(),
            value,
        });
    }
}

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Validate a sweep configuration.
pub fn validate_sweep(config: &SweepConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    let rate_ok = check_positive(&mut errors, "sample_rate", config.sample_rate);
    let start_ok = check_positive(&mut errors, "start_frequency", config.start_frequency);
    if start_ok && !(config.stop_frequency.is_finite() && config.stop_frequency > config.start_frequency) {
        errors.push(ValidationError::FrequencyOrder {
            start: config.start_frequency,
            stop: config.stop_frequency,
        });
    } else if rate_ok && config.stop_frequency > config.sample_rate / 2.0 {
        errors.push(ValidationError::AboveNyquist {
            stop: config.stop_frequency,
            nyquist: config.sample_rate / 2.0,
        });
    }

    match (config.duration_secs, config.approximate_length) {
        (Some(_), Some(_)) => errors.push(ValidationError::ConflictingLength),
        (Some(duration), None) => {
            if check_positive(&mut errors, "duration_secs", duration)
                && rate_ok
                && (duration * config.sample_rate).round() < 1.0
            {
                errors.push(ValidationError::ZeroLength);
            }
        }
        (None, Some(0)) => errors.push(ValidationError::ZeroLength),
        _ => {}
    }

    check_non_negative(&mut errors, "fade_in_secs", config.fade_in_secs);
    check_non_negative(&mut errors, "fade_out_secs", config.fade_out_secs);
    check_positive(&mut errors, "amplitude", config.amplitude);

    collect(errors)
}

/// Validate a model configuration.
///
/// File filters are only checked when the model is built.
pub fn validate_model(config: &ModelConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    check_positive(&mut errors, "sample_rate", config.sample_rate);
    if config.branches.is_empty() {
        errors.push(ValidationError::NoBranches);
    }

    for (branch, branch_config) in config.branches.iter().enumerate() {
        if branch_config.degree == 0 {
            errors.push(ValidationError::InvalidDegree { branch });
        }
        match branch_config.filter {
            FilterConfig::Impulse { length } | FilterConfig::Delay { length, .. } if length == 0 => {
                errors.push(ValidationError::EmptyFilter { branch });
            }
            FilterConfig::Delay { samples, length } if samples >= length => {
                errors.push(ValidationError::DelayOutOfRange {
                    branch,
                    samples,
                    length,
                });
            }
            _ => {}
        }
    }

    collect(errors)
}
