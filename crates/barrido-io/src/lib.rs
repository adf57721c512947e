//! WAV file I/O for barrido signals.
//!
//! - [`read_wav`] loads every channel of a file into a [`Signal`](barrido_core::Signal)
//! - [`write_wav`] stores a signal as 32-bit float or 16/24-bit PCM
//! - [`read_wav_info`] reads the header only
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use barrido_io::{read_wav, write_wav};
//!
//! let response = read_wav("response.wav")?;
//! write_wav("copy.wav", &response, 24)?;
//! ```

mod wav;

pub use wav::{WavFormat, WavInfo, read_wav, read_wav_info, write_wav};

/// Error types for WAV I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file's samples do not form a valid signal.
    #[error("signal error: {0}")]
    Signal(#[from] barrido_core::Error),

    /// The requested sample format or rate cannot be stored.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for WAV I/O.
pub type Result<T> = std::result::Result<T, Error>;
