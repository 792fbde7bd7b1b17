//! Test signal generation command.

use clap::Args;
use forma_io::{WavSpec, normalize_peak, write_wav};
use forma_shapes::three_tone;
use std::path::PathBuf;

#[derive(Args)]
pub struct GenerateArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Duration in seconds
    #[arg(long, default_value = "10.0")]
    duration: f64,

    /// Sample rate
    #[arg(long, default_value = "44100")]
    sample_rate: u32,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    if !(args.duration.is_finite() && args.duration > 0.0) {
        anyhow::bail!("duration must be positive, got {}", args.duration);
    }
    if args.sample_rate == 0 {
        anyhow::bail!("sample rate must be positive");
    }

    println!(
        "Generating three-tone signal: 100/200/300 Hz, {:.2}s at {} Hz",
        args.duration, args.sample_rate
    );
    let samples = normalize_peak(&three_tone(args.duration, f64::from(args.sample_rate)));

    let spec = WavSpec {
        channels: 1,
        sample_rate: args.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    write_wav(&args.output, &samples, spec)?;
    println!("Saved {} samples to {}", samples.len(), args.output.display());
    Ok(())
}
