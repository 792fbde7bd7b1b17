//! Transport-facing entry point: one signal, several plans, one call.

use crate::decompose::Decomposition;
use crate::error::{Result, ShapeError};
use crate::shaper::Shaper;
use crate::signal::time_axis;
use crate::stream::run_streaming;
use crate::transform::Plan;

/// How plans are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Whole-array procedures with a shared windowed-RMS memo.
    #[default]
    Batch,
    /// One node graph per plan, ticked once per sample.
    Streaming,
}

/// Parameters shared by every plan in a render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Input sample rate in Hz.
    pub sample_rate: f64,
    /// Window in samples.
    pub window: usize,
    /// Batch or streaming evaluation.
    pub mode: Mode,
    /// Memo entries kept in batch mode.
    pub memo_capacity: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            window: 10_000,
            mode: Mode::Batch,
            memo_capacity: 32,
        }
    }
}

/// Output of [`render`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rendering {
    /// Time of each sample in seconds.
    pub time: Vec<f64>,
    /// One decomposition per plan, in plan order.
    pub signals: Vec<Decomposition>,
}

/// Evaluates every plan over `signal`.
///
/// # Errors
///
/// [`ShapeError::InvalidWindow`], [`ShapeError::InvalidSampleRate`], or
/// [`ShapeError::EmptyPlan`] for bad parameters; graph errors in streaming
/// mode.
pub fn render(signal: &[f64], plans: &[Plan], options: &RenderOptions) -> Result<Rendering> {
    if options.window == 0 {
        return Err(ShapeError::InvalidWindow);
    }
    if !(options.sample_rate.is_finite() && options.sample_rate > 0.0) {
        return Err(ShapeError::InvalidSampleRate(options.sample_rate));
    }
    if plans.iter().any(|plan| plan.passes() == 0) {
        return Err(ShapeError::EmptyPlan);
    }

    tracing::info!(
        "rendering {} plan(s) over {} samples, window {}, {:?} mode",
        plans.len(),
        signal.len(),
        options.window,
        options.mode
    );

    let signals = match options.mode {
        Mode::Batch => {
            let mut shaper = Shaper::new(options.window, options.memo_capacity);
            plans.iter().map(|plan| shaper.run(plan, signal)).collect()
        }
        Mode::Streaming => plans
            .iter()
            .map(|plan| run_streaming(plan, signal, options.sample_rate, options.window))
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(Rendering {
        time: time_axis(signal.len(), options.sample_rate),
        signals,
    })
}
