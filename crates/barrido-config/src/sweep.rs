//! Sweep file format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use barrido_analysis::sweep::{
    DEFAULT_APPROXIMATE_LENGTH, DEFAULT_FADE_SECS, DEFAULT_START_FREQUENCY, DEFAULT_STOP_FREQUENCY,
};
use barrido_analysis::{NovakSweep, SweepParameters, SweepPhase};

use crate::error::{ConfigError, read_toml, write_toml};
use crate::validation::validate_sweep;

/// Sweep variant as written in TOML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseConfig {
    /// `sin θ(t)`.
    #[default]
    Sine,
    /// `cos θ(t)`.
    Cosine,
}

impl From<PhaseConfig> for SweepPhase {
    fn from(phase: PhaseConfig) -> Self {
        match phase {
            PhaseConfig::Sine => SweepPhase::Sine,
            PhaseConfig::Cosine => SweepPhase::Cosine,
        }
    }
}

impl From<SweepPhase> for PhaseConfig {
    fn from(phase: SweepPhase) -> Self {
        match phase {
            SweepPhase::Sine => PhaseConfig::Sine,
            SweepPhase::Cosine => PhaseConfig::Cosine,
        }
    }
}

/// Sweep description.
///
/// The length is given either as `duration_secs` or as `approximate_length` in
/// samples; with neither, the default target length applies. Fades are in
/// seconds and truncate to whole samples.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 44100
/// start_frequency = 20.0
/// stop_frequency = 20000.0
/// duration_secs = 1.0
/// fade_in_secs = 0.02
/// fade_out_secs = 0.02
/// amplitude = 0.5
/// phase = "cosine"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    /// Sampling rate in Hz (defaults to 48000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,

    /// Start frequency in Hz.
    #[serde(default = "default_start_frequency")]
    pub start_frequency: f64,

    /// Stop frequency in Hz.
    #[serde(default = "default_stop_frequency")]
    pub stop_frequency: f64,

    /// Target duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,

    /// Target length in samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_length: Option<usize>,

    /// Fade-in duration in seconds.
    #[serde(default = "default_fade_secs")]
    pub fade_in_secs: f64,

    /// Fade-out duration in seconds.
    #[serde(default = "default_fade_secs")]
    pub fade_out_secs: f64,

    /// Amplitude multiplier.
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,

    /// Sweep variant.
    #[serde(default)]
    pub phase: PhaseConfig,
}

fn default_sample_rate() -> f64 {
    barrido_core::DEFAULT_SAMPLING_RATE
}

fn default_start_frequency() -> f64 {
    DEFAULT_START_FREQUENCY
}

fn default_stop_frequency() -> f64 {
    DEFAULT_STOP_FREQUENCY
}

fn default_fade_secs() -> f64 {
    DEFAULT_FADE_SECS
}

fn default_amplitude() -> f64 {
    1.0
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            start_frequency: default_start_frequency(),
            stop_frequency: default_stop_frequency(),
            duration_secs: None,
            approximate_length: None,
            fade_in_secs: default_fade_secs(),
            fade_out_secs: default_fade_secs(),
            amplitude: default_amplitude(),
            phase: PhaseConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Load a sweep configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_toml(&read_toml(path)?)?;
        tracing::debug!(path = %path.display(), "loaded sweep configuration");
        Ok(config)
    }

    /// Load a sweep configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_toml(path.as_ref(), &self.to_toml()?)
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Target length in samples.
    pub fn target_length(&self) -> usize {
        match (self.approximate_length, self.duration_secs) {
            (Some(length), _) => length,
            (None, Some(duration)) => (duration * self.sample_rate).round() as usize,
            (None, None) => DEFAULT_APPROXIMATE_LENGTH,
        }
    }

    /// Validated generator parameters.
    pub fn parameters(&self) -> Result<SweepParameters, ConfigError> {
        validate_sweep(self)?;
        Ok(SweepParameters::new(
            self.sample_rate,
            self.start_frequency,
            self.stop_frequency,
            self.target_length(),
        )
        .with_fade_secs(self.fade_in_secs, self.fade_out_secs)
        .with_amplitude(self.amplitude))
    }

    /// Build the sweep generator.
    pub fn build(&self) -> Result<NovakSweep, ConfigError> {
        Ok(NovakSweep::new(self.parameters()?, self.phase.into())?)
    }
}

impl From<&NovakSweep> for SweepConfig {
    fn from(sweep: &NovakSweep) -> Self {
        let rate = sweep.sampling_rate();
        Self {
            sample_rate: rate,
            start_frequency: sweep.start_frequency(),
            stop_frequency: sweep.stop_frequency(),
            duration_secs: None,
            approximate_length: Some(sweep.approximate_length()),
            fade_in_secs: sweep.fade_in() as f64 / rate,
            fade_out_secs: sweep.fade_out() as f64 / rate,
            amplitude: sweep.amplitude_scale(),
            phase: sweep.phase().into(),
        }
    }
}
