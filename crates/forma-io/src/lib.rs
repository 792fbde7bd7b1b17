//! Audio file I/O for forma.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for loading and saving mono signals
//! - **Metadata**: [`read_wav_info`] for format details without decoding samples
//! - **Normalisation**: [`normalize_peak`] to scale a signal to unit peak before writing
//!
//! Samples are `f64` in `[-1, 1]`; multi-channel input is mixed down to mono.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use forma_io::{normalize_peak, read_wav, write_wav};
//!
//! let (samples, spec) = read_wav("input.wav")?;
//! let shaped = forma_shapes::square_wave(&samples, 10_000);
//! write_wav("output.wav", &normalize_peak(&shaped), spec)?;
//! ```

mod wav;

pub use wav::{WavFormat, WavInfo, WavSpec, normalize_peak, read_wav, read_wav_info, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
