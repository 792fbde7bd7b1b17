//! WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

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
    let total_samples = u64::from(reader.len());
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

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels. Always 1 for written files.
    pub channels: u16,
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,
    /// Bit depth per sample: 16, 24, or 32 (float).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: 1,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// How samples are stored on disk for a given bit depth.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Encoding {
    Float,
    Pcm { full_scale: f64 },
}

impl Encoding {
    fn for_output(bits_per_sample: u16) -> Result<Self> {
        match bits_per_sample {
            32 => Ok(Self::Float),
            16 | 24 => Ok(Self::Pcm {
                full_scale: pcm_full_scale(bits_per_sample),
            }),
            other => Err(Error::UnsupportedFormat(format!(
                "{other}-bit output (expected 16, 24, or 32)"
            ))),
        }
    }
}

/// `2^(bits - 1)`, the magnitude that maps to 1.0.
fn pcm_full_scale(bits_per_sample: u16) -> f64 {
    f64::from(bits_per_sample.saturating_sub(1)).exp2()
}

/// Nearest PCM code for `sample`, saturating at full scale. NaN maps to 0.
fn quantize(sample: f64, full_scale: f64) -> i32 {
    (sample * full_scale).round().clamp(-full_scale, full_scale - 1.0) as i32
}

/// Averages each `channels`-sample frame of an interleaved stream.
fn fold_frames(
    samples: impl Iterator<Item = hound::Result<f64>>,
    channels: usize,
) -> Result<Vec<f64>> {
    let mut signal = Vec::with_capacity(samples.size_hint().0 / channels);
    let mut frame = 0.0;
    let mut filled = 0;
    for sample in samples {
        frame += sample?;
        filled += 1;
        if filled == channels {
            signal.push(frame / channels as f64);
            frame = 0.0;
            filled = 0;
        }
    }
    Ok(signal)
}

/// Decode a WAV file into one `f64` signal plus its spec.
///
/// Interleaved channels are averaged frame by frame; integer codes are
/// scaled so full scale reads as 1.0.
///
/// # Example
/// ```ignore
/// let (signal, spec) = read_wav("input.wav")?;
/// println!("{} samples at {} Hz", signal.len(), spec.sample_rate);
/// ```
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f64>, WavSpec)> {
    let path = path.as_ref();
    let mut reader = WavReader::open(path)?;
    let format = reader.spec().sample_format;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels.max(1));

    let signal = match format {
        SampleFormat::Float => fold_frames(
            reader.samples::<f32>().map(|s| s.map(f64::from)),
            channels,
        )?,
        SampleFormat::Int => {
            let full_scale = pcm_full_scale(spec.bits_per_sample);
            fold_frames(
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|code| f64::from(code) / full_scale)),
                channels,
            )?
        }
    };

    tracing::debug!(
        "decoded {}: {} samples from {} ch at {} Hz ({}-bit)",
        path.display(),
        signal.len(),
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample
    );
    Ok((signal, spec))
}

/// Encode a mono signal as a WAV file.
///
/// 32-bit output is IEEE float. 16- and 24-bit output is PCM, rounded to
/// the nearest code and saturated at full scale.
///
/// # Example
/// ```ignore
/// let silence = vec![0.0; 44100];
/// write_wav("output.wav", &silence, WavSpec::default())?;
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, signal: &[f64], spec: WavSpec) -> Result<()> {
    let encoding = Encoding::for_output(spec.bits_per_sample)?;
    let path = path.as_ref();
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;
    for &sample in signal {
        match encoding {
            Encoding::Float => writer.write_sample(sample as f32)?,
            Encoding::Pcm { full_scale } => writer.write_sample(quantize(sample, full_scale))?,
        }
    }
    writer.finalize()?;
    tracing::debug!("encoded {}: {} samples", path.display(), signal.len());
    Ok(())
}

/// Scales `samples` so the largest magnitude is 1.
///
/// Silent or non-finite-peak input is returned unchanged.
pub fn normalize_peak(samples: &[f64]) -> Vec<f64> {
    let peak = samples.iter().fold(0.0f64, |m, x| m.max(x.abs()));
    if peak > 0.0 && peak.is_finite() {
        samples.iter().map(|x| x / peak).collect()
    } else {
        samples.to_vec()
    }
}
