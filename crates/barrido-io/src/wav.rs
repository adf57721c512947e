//! WAV file reading and writing.

use std::path::Path;

use barrido_core::Signal;
use hound::{SampleFormat, WavReader, WavWriter};

use crate::{Error, Result};

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len()); // total across all channels
    let num_frames = total_samples / u64::from(spec.channels.max(1));
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// Read a WAV file into a signal with one channel per file channel.
///
/// Integer PCM is normalized to `[-1, 1)`.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<Signal> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels);
    if channels == 0 {
        return Err(Error::UnsupportedFormat("file has no channels".into()));
    }

    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = f64::from(1u32 << (spec.bits_per_sample - 1));
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    // Deinterleave
    let frames = interleaved.len() / channels;
    let mut data = vec![Vec::with_capacity(frames); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (channel, &sample) in data.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    tracing::debug!(path = %path.display(), channels, frames, rate = spec.sample_rate, "read WAV");
    Ok(Signal::new(data, f64::from(spec.sample_rate), Vec::new())?)
}

/// Write a signal to a WAV file.
///
/// `bits_per_sample` selects 32-bit float or 16/24-bit PCM; PCM samples are
/// clipped to the representable range. The sampling rate must be a whole number
/// of Hz.
pub fn write_wav<P: AsRef<Path>>(path: P, signal: &Signal, bits_per_sample: u16) -> Result<()> {
    let rate = signal.sampling_rate();
    if rate.fract() != 0.0 || rate > f64::from(u32::MAX) {
        return Err(Error::UnsupportedFormat(format!(
            "sampling rate {rate} Hz is not a whole number of Hz"
        )));
    }
    let sample_format = match bits_per_sample {
        32 => SampleFormat::Float,
        16 | 24 => SampleFormat::Int,
        other => {
            return Err(Error::UnsupportedFormat(format!(
                "{other}-bit samples (use 16, 24 or 32)"
            )));
        }
    };
    let channels = u16::try_from(signal.channel_count())
        .map_err(|_| Error::UnsupportedFormat(format!("{} channels", signal.channel_count())))?;

    let hound_spec = hound::WavSpec {
        channels,
        sample_rate: rate as u32,
        bits_per_sample,
        sample_format,
    };
    let mut writer = WavWriter::create(path, hound_spec)?;

    let max_val = f64::from(1u32 << (bits_per_sample - 1));
    for i in 0..signal.len() {
        for channel in signal.channels() {
            let sample = channel[i];
            match sample_format {
                SampleFormat::Float => writer.write_sample(sample as f32)?,
                SampleFormat::Int => {
                    let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
                    writer.write_sample(int_sample)?;
                }
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
