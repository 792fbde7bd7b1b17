//! Integration tests for forma-io WAV I/O.

use forma_io::{WavFormat, WavSpec, normalize_peak, read_wav, read_wav_info, write_wav};
use tempfile::NamedTempFile;

#[test]
fn wav_roundtrip_three_tone_24bit() {
    let sr = 44100;
    let signal = normalize_peak(&forma_shapes::three_tone(0.5, f64::from(sr)));
    let spec = WavSpec {
        channels: 1,
        sample_rate: sr,
        bits_per_sample: 24,
    };

    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &signal, spec).unwrap();

    let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
    assert_eq!(loaded_spec, spec);
    assert_eq!(loaded.len(), signal.len());
    for (a, b) in signal.iter().zip(&loaded) {
        assert!((a - b).abs() < 1e-6, "sample mismatch: {a} vs {b}");
    }
}

#[test]
fn wav_info_reports_duration() {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
    };
    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &vec![0.0; 4000], spec).unwrap();

    let info = read_wav_info(file.path()).unwrap();
    assert_eq!(info.num_frames, 4000);
    assert_eq!(info.format, WavFormat::Pcm);
    assert!((info.duration_secs - 0.5).abs() < 1e-12);
}

#[test]
fn full_scale_is_clamped_for_pcm() {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
    };
    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &[1.5, -1.5], spec).unwrap();

    let (loaded, _) = read_wav(file.path()).unwrap();
    assert!(loaded[0] < 1.0 && loaded[0] > 0.999);
    assert_eq!(loaded[1], -1.0);
}

#[test]
fn missing_file_is_an_error() {
    assert!(read_wav("/nonexistent/forma/input.wav").is_err());
}
