//! Shared CLI helpers used across multiple commands.

use clap::Args;
use forma_config::{JobConfig, PlanConfig, TransformConfig};
use forma_shapes::Transform;
use std::path::{Path, PathBuf};

/// Plan selection flags shared by `process` and `order`.
#[derive(Args, Debug, Default)]
pub struct PlanArgs {
    /// Job file (TOML); flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Window in samples
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Transform for an iterative plan: square, triangle, or triangle:sign-change
    #[arg(short, long)]
    pub transform: Option<Transform>,

    /// Passes for an iterative plan (default 1 when --transform is given)
    #[arg(short, long)]
    pub passes: Option<usize>,

    /// Comma-separated transforms for a combo plan (e.g. "square,triangle")
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["transform", "passes"])]
    pub combo: Vec<Transform>,
}

impl PlanArgs {
    /// Loads the job file, if any, and applies flag overrides.
    pub fn job(&self) -> anyhow::Result<JobConfig> {
        let mut job = match &self.config {
            Some(path) => {
                let job = JobConfig::load(path)?;
                tracing::info!("loaded job '{}' from {}", job.name, path.display());
                job
            }
            None => JobConfig::default(),
        };

        if let Some(window) = self.window {
            job.window = window;
        }
        if !self.combo.is_empty() {
            job.plans = vec![PlanConfig::combo(
                self.combo.iter().copied().map(TransformConfig::from),
            )];
        } else if self.transform.is_some() || self.passes.is_some() {
            let transform = self.transform.unwrap_or(Transform::SQUARE);
            job.plans = vec![PlanConfig::iterative(
                transform.into(),
                self.passes.unwrap_or(1),
            )];
        }
        Ok(job)
    }
}

/// Output path for plan `k` (1-based): `OUTPUT` for the first, `<stem>_<k>.<ext>` after.
pub fn numbered_path(path: &Path, k: usize) -> PathBuf {
    if k <= 1 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().into_owned());
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{k}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{k}"),
    };
    path.with_file_name(name)
}

pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f64).sqrt()
}

pub fn peak(samples: &[f64]) -> f64 {
    samples.iter().map(|s| s.abs()).fold(0.0, f64::max)
}

pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}
