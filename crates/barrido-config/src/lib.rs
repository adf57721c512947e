//! Configuration files for barrido measurements.
//!
//! Sweeps and Hammerstein group models are described in TOML and turned into a
//! [`NovakSweep`](barrido_analysis::NovakSweep) or a
//! [`HammersteinGroupModel`](barrido_models::HammersteinGroupModel).
//!
//! # Features
//!
//! - **Sweeps**: rate, frequency range, length, fades, amplitude and variant
//! - **Models**: power branches with generated or file-based filters, aliasing
//!   compensation and downsampling position
//! - **Validation**: every field checked, all problems reported together
//!
//! # Example
//!
//! ```rust,no_run
//! use barrido_config::{ModelConfig, SweepConfig};
//!
//! let sweep = SweepConfig::load("sweep.toml").unwrap().build().unwrap();
//! let excitation = sweep.generate().unwrap();
//!
//! let model = ModelConfig::load("model.toml")
//!     .unwrap()
//!     .build(excitation, None)
//!     .unwrap();
//! println!("{} samples", model.output().len());
//! ```

mod error;
mod model;
mod sweep;

/// Sweep and model validation.
pub mod validation;

pub use error::ConfigError;
pub use model::{AliasingConfig, BranchConfig, DownsamplingConfig, FilterConfig, ModelConfig};
pub use sweep::{PhaseConfig, SweepConfig};
pub use validation::{ValidationError, ValidationResult, validate_model, validate_sweep};
