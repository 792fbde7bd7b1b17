//! Memoised batch application of transforms and plans.

use crate::decompose::{Decomposition, accumulate};
use crate::memo::WindowMemo;
use crate::square::square_from_rms;
use crate::transform::{Plan, Transform};
use crate::triangle::triangle_from_rms;

/// Applies transforms at a fixed window, reusing windowed RMS across calls.
///
/// Running several plans over one signal recomputes nothing for the first
/// pass of each plan after the first, since each starts from the same input.
#[derive(Debug)]
pub struct Shaper {
    window: usize,
    memo: WindowMemo,
}

impl Shaper {
    /// Creates a shaper with a memo of `memo_capacity` entries.
    pub fn new(window: usize, memo_capacity: usize) -> Self {
        Self {
            window: window.max(1),
            memo: WindowMemo::new(memo_capacity),
        }
    }

    /// Window in samples.
    pub fn window(&self) -> usize {
        self.window
    }

    /// The underlying memo, for hit statistics.
    pub fn memo(&self) -> &WindowMemo {
        &self.memo
    }

    /// Applies one transform to `signal`.
    pub fn apply(&mut self, transform: Transform, signal: &[f64]) -> Vec<f64> {
        let window = self.window;
        let rms = self.memo.sliding_rms(signal, window);
        match transform {
            Transform::Square { bias } => square_from_rms(signal, &rms, bias),
            Transform::Triangle { rule } => {
                let memo = &mut self.memo;
                triangle_from_rms(signal, &rms, window, rule, |filtered| {
                    memo.sliding_rms(filtered, window).to_vec()
                })
            }
        }
    }

    /// Runs every pass of `plan` over `signal`.
    pub fn run(&mut self, plan: &Plan, signal: &[f64]) -> Decomposition {
        let transforms = plan.transforms();
        let result = accumulate(signal, transforms.len(), |pass, residual| {
            self.apply(transforms[pass], residual)
        });
        tracing::debug!(
            "shaper: {} done, memo {} hits / {} misses",
            plan.label(),
            self.memo.hits(),
            self.memo.misses()
        );
        result
    }
}
