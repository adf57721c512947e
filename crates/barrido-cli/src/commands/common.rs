//! Arguments shared between commands.

use barrido_config::{PhaseConfig, SweepConfig};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Sweep variant for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliPhase {
    Sine,
    Cosine,
}

impl From<CliPhase> for PhaseConfig {
    fn from(p: CliPhase) -> Self {
        match p {
            CliPhase::Sine => PhaseConfig::Sine,
            CliPhase::Cosine => PhaseConfig::Cosine,
        }
    }
}

/// Sweep parameters: a TOML file, overridden by any flag given.
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Sweep configuration file (TOML)
    #[arg(long = "config", visible_alias = "sweep", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<f64>,

    /// Start frequency in Hz
    #[arg(long)]
    pub start: Option<f64>,

    /// Stop frequency in Hz
    #[arg(long)]
    pub stop: Option<f64>,

    /// Target duration in seconds
    #[arg(long, conflicts_with = "length")]
    pub duration: Option<f64>,

    /// Target length in samples
    #[arg(long)]
    pub length: Option<usize>,

    /// Fade-in duration in seconds
    #[arg(long)]
    pub fade_in: Option<f64>,

    /// Fade-out duration in seconds
    #[arg(long)]
    pub fade_out: Option<f64>,

    /// Amplitude multiplier
    #[arg(long)]
    pub amplitude: Option<f64>,

    /// Sweep variant
    #[arg(long, value_enum)]
    pub phase: Option<CliPhase>,
}

impl SweepArgs {
    /// Resolve the effective sweep configuration.
    pub fn resolve(&self) -> anyhow::Result<SweepConfig> {
        let mut config = match &self.config {
            Some(path) => SweepConfig::load(path)?,
            None => SweepConfig::default(),
        };
        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        if let Some(start) = self.start {
            config.start_frequency = start;
        }
        if let Some(stop) = self.stop {
            config.stop_frequency = stop;
        }
        // A length given on the command line replaces either form from the file
        if self.duration.is_some() || self.length.is_some() {
            config.duration_secs = self.duration;
            config.approximate_length = self.length;
        }
        if let Some(fade_in) = self.fade_in {
            config.fade_in_secs = fade_in;
        }
        if let Some(fade_out) = self.fade_out {
            config.fade_out_secs = fade_out;
        }
        if let Some(amplitude) = self.amplitude {
            config.amplitude = amplitude;
        }
        if let Some(phase) = self.phase {
            config.phase = phase.into();
        }
        Ok(config)
    }
}

/// Parse an output bit depth (16, 24 or 32).
pub fn parse_bit_depth(s: &str) -> Result<u16, String> {
    match s.parse::<u16>() {
        Ok(bits @ (16 | 24 | 32)) => Ok(bits),
        _ => Err(format!("invalid bit depth '{s}' (expected 16, 24 or 32)")),
    }
}

/// `ir.wav` → `ir_h3.wav`
pub fn harmonic_path(path: &std::path::Path, order: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_h{order}.{}", ext.to_string_lossy()),
        None => format!("{stem}_h{order}"),
    };
    path.with_file_name(name)
}
