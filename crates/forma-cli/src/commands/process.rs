//! File-based decomposition command.

use super::common::{PlanArgs, linear_to_db, numbered_path, peak, rms};
use clap::Args;
use forma_config::ModeConfig;
use forma_io::{WavSpec, normalize_peak, read_wav, write_wav};
use forma_shapes::{Decomposition, Mode, render, run_streaming_with};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file; plan k > 1 is written next to it as <stem>_<k>.<ext>
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    plan: PlanArgs,

    /// Evaluate sample by sample through node graphs
    #[arg(long)]
    streaming: bool,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,

    /// Write outputs at their natural level instead of peak-normalising
    #[arg(long)]
    no_normalize: bool,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let mut job = args.plan.job()?;
    if args.streaming {
        job.mode = ModeConfig::Streaming;
    }

    println!("Reading {}...", args.input.display());
    let (samples, spec) = read_wav(&args.input)?;
    job.sample_rate = spec.sample_rate;
    job.validate()?;

    println!(
        "  {} samples, {} Hz, {:.2}s",
        samples.len(),
        spec.sample_rate,
        samples.len() as f64 / f64::from(spec.sample_rate)
    );

    let options = job.render_options();
    let plans = job.to_plans();
    println!(
        "Running {} plan(s), window {}, {:?} mode...",
        plans.len(),
        options.window,
        options.mode
    );

    let decompositions: Vec<Decomposition> = match options.mode {
        Mode::Batch => render(&samples, &plans, &options)?.signals,
        Mode::Streaming => {
            let mut results = Vec::with_capacity(plans.len());
            for plan in &plans {
                let pb = ProgressBar::new(samples.len() as u64);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
                        .progress_chars("##-"),
                );
                pb.set_message(plan.label());
                let decomposition = run_streaming_with(
                    plan,
                    &samples,
                    options.sample_rate,
                    options.window,
                    |done| {
                        if done % 1024 == 0 || done == samples.len() {
                            pb.set_position(done as u64);
                        }
                    },
                )?;
                pb.finish_with_message("done");
                results.push(decomposition);
            }
            results
        }
    };

    println!("\nStats:");
    println!(
        "  Input:          RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&samples)),
        linear_to_db(peak(&samples))
    );

    let out_spec = WavSpec {
        channels: 1,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };

    for (index, (plan, decomposition)) in plans.iter().zip(&decompositions).enumerate() {
        println!(
            "  {:<14}  RMS {:.1} dB, residual RMS {:.1} dB",
            plan.label(),
            linear_to_db(rms(&decomposition.output)),
            linear_to_db(rms(&decomposition.residual))
        );

        let path = numbered_path(&args.output, index + 1);
        let output = if args.no_normalize {
            decomposition.output.clone()
        } else {
            normalize_peak(&decomposition.output)
        };
        write_wav(&path, &output, out_spec)?;
        println!("    -> {}", path.display());
    }

    println!("Done!");
    Ok(())
}
