//! Hammerstein group model file format.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use barrido_core::Signal;
use barrido_models::{
    AliasingCompensation, DEFAULT_FILTER_LENGTH, DownsamplingPosition,
    FullUpsamplingAliasingCompensation, HammersteinGroupModel, NoAliasingCompensation,
    NonlinearFunction, Power,
};

use crate::error::{ConfigError, read_toml, write_toml};
use crate::validation::validate_model;

/// Aliasing compensation strategy as written in TOML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AliasingConfig {
    /// [`NoAliasingCompensation`].
    #[default]
    None,
    /// [`FullUpsamplingAliasingCompensation`].
    FullUpsampling,
}

/// Downsampling position as written in TOML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownsamplingConfig {
    /// [`DownsamplingPosition::AfterNonlinearBlock`].
    #[default]
    AfterNonlinear,
    /// [`DownsamplingPosition::AfterLinearBlock`].
    AfterLinear,
}

impl From<DownsamplingConfig> for DownsamplingPosition {
    fn from(position: DownsamplingConfig) -> Self {
        match position {
            DownsamplingConfig::AfterNonlinear => DownsamplingPosition::AfterNonlinearBlock,
            DownsamplingConfig::AfterLinear => DownsamplingPosition::AfterLinearBlock,
        }
    }
}

/// Filter impulse response of one branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FilterConfig {
    /// Unit impulse (identity filter).
    Impulse {
        /// Length in samples.
        #[serde(default = "default_filter_length")]
        length: usize,
    },
    /// Unit impulse delayed by `samples`.
    Delay {
        /// Delay in samples.
        samples: usize,
        /// Length in samples.
        #[serde(default = "default_filter_length")]
        length: usize,
    },
    /// Impulse response loaded from a WAV file.
    ///
    /// Relative paths resolve against the directory passed to
    /// [`ModelConfig::build`], usually the model file's directory.
    File {
        /// Path of the WAV file.
        path: PathBuf,
    },
}

fn default_filter_length() -> usize {
    DEFAULT_FILTER_LENGTH
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig::Impulse {
            length: DEFAULT_FILTER_LENGTH,
        }
    }
}

impl FilterConfig {
    /// Generate or load the impulse response.
    ///
    /// Generated filters use `sample_rate`; files keep their own rate.
    pub fn impulse_response(
        &self,
        sample_rate: f64,
        base_dir: Option<&Path>,
    ) -> Result<Signal, ConfigError> {
        match self {
            FilterConfig::Impulse { length } => Ok(Signal::impulse(sample_rate, *length)?),
            FilterConfig::Delay { samples, length } => {
                let mut taps = vec![0.0; *length];
                if let Some(tap) = taps.get_mut(*samples) {
                    *tap = 1.0;
                }
                Ok(Signal::mono(taps, sample_rate, format!("Delay {samples}"))?)
            }
            FilterConfig::File { path } => {
                let resolved = match base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path.clone(),
                };
                barrido_io::read_wav(&resolved).map_err(|e| ConfigError::filter_file(&resolved, e))
            }
        }
    }
}

/// One branch: a power nonlinearity followed by a filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchConfig {
    /// Exponent of the power nonlinearity.
    pub degree: u32,

    /// Filter impulse response (defaults to a unit impulse).
    #[serde(default)]
    pub filter: FilterConfig,
}

impl BranchConfig {
    /// Branch `x^degree` with an identity filter.
    pub fn power(degree: u32) -> Self {
        Self {
            degree,
            filter: FilterConfig::default(),
        }
    }

    /// Replace the filter.
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }
}

/// Hammerstein group model description.
///
/// # TOML Format
///
/// ```toml
/// name = "Cubic loudspeaker"
/// sample_rate = 48000
/// aliasing = "full-upsampling"
/// downsampling = "after-linear"
///
/// [[branches]]
/// degree = 1
/// [branches.filter]
/// kind = "impulse"
/// length = 1024
///
/// [[branches]]
/// degree = 3
/// [branches.filter]
/// kind = "file"
/// path = "cubic_ir.wav"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Name of the model.
    #[serde(default)]
    pub name: String,

    /// Optional description of the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sampling rate of generated filters (defaults to 48000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,

    /// Aliasing compensation strategy.
    #[serde(default)]
    pub aliasing: AliasingConfig,

    /// Resampling filter taps for upsampling compensation (default when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_order: Option<usize>,

    /// Where downsampling happens in each branch.
    #[serde(default)]
    pub downsampling: DownsamplingConfig,

    /// Branches, summed in order.
    #[serde(default)]
    pub branches: Vec<BranchConfig>,
}

fn default_sample_rate() -> f64 {
    barrido_core::DEFAULT_SAMPLING_RATE
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            sample_rate: default_sample_rate(),
            aliasing: AliasingConfig::default(),
            filter_order: None,
            downsampling: DownsamplingConfig::default(),
            branches: vec![BranchConfig::power(1)],
        }
    }
}

impl ModelConfig {
    /// Create a model with the given name and no branches.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branches: Vec::new(),
            ..Self::default()
        }
    }

    /// Set the aliasing compensation strategy.
    pub fn with_aliasing(mut self, aliasing: AliasingConfig) -> Self {
        self.aliasing = aliasing;
        self
    }

    /// Set the downsampling position.
    pub fn with_downsampling(mut self, downsampling: DownsamplingConfig) -> Self {
        self.downsampling = downsampling;
        self
    }

    /// Add a branch.
    pub fn with_branch(mut self, branch: BranchConfig) -> Self {
        self.branches.push(branch);
        self
    }

    /// Load a model from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_toml(&read_toml(path)?)?;
        tracing::debug!(path = %path.display(), branches = config.branches.len(), "loaded model configuration");
        Ok(config)
    }

    /// Load a model from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the model to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_toml(path.as_ref(), &self.to_toml()?)
    }

    /// Convert the model to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// One [`Power`] per branch.
    pub fn nonlinear_functions(&self) -> Result<Vec<Arc<dyn NonlinearFunction>>, ConfigError> {
        self.branches
            .iter()
            .map(|b| -> Result<Arc<dyn NonlinearFunction>, ConfigError> {
                Ok(Arc::new(Power::new(b.degree)?))
            })
            .collect()
    }

    /// One impulse response per branch.
    pub fn filter_impulse_responses(
        &self,
        base_dir: Option<&Path>,
    ) -> Result<Vec<Signal>, ConfigError> {
        self.branches
            .iter()
            .map(|b| b.filter.impulse_response(self.sample_rate, base_dir))
            .collect()
    }

    /// Aliasing compensation prototype.
    pub fn aliasing_compensation(&self) -> Box<dyn AliasingCompensation> {
        match self.aliasing {
            AliasingConfig::None => Box::new(NoAliasingCompensation::new()),
            AliasingConfig::FullUpsampling => Box::new(
                FullUpsamplingAliasingCompensation::with_filter_order(
                    self.filter_order.unwrap_or(0),
                ),
            ),
        }
    }

    /// Validate and build the model, evaluated for `input`.
    ///
    /// Relative filter paths resolve against `base_dir` when given.
    pub fn build(
        &self,
        input: Signal,
        base_dir: Option<&Path>,
    ) -> Result<HammersteinGroupModel, ConfigError> {
        validate_model(self)?;
        let model = HammersteinGroupModel::new(
            input,
            self.nonlinear_functions()?,
            self.filter_impulse_responses(base_dir)?,
            self.aliasing_compensation(),
            self.downsampling.into(),
        )?;
        Ok(model)
    }
}
