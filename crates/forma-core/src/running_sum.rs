//! Incremental trailing-window sum.

/// Sum of the most recent `window` samples, updated in O(1) per sample.
///
/// The accumulator adds the newest sample and subtracts the one that just
/// fell out of the window, which it reads back from the caller's history.
///
/// ## Example
///
/// ```rust
/// use forma_core::RunningSum;
///
/// let history = [1.0, 2.0, 3.0, 4.0];
/// let mut sum = RunningSum::new(2);
/// let sums: Vec<f64> = (1..=history.len()).map(|n| sum.push(&history[..n])).collect();
/// assert_eq!(sums, vec![1.0, 3.0, 5.0, 7.0]);
/// ```
#[derive(Debug, Clone)]
pub struct RunningSum {
    window: usize,
    sum: f64,
}

impl RunningSum {
    /// Create an accumulator over a trailing window of `window` samples.
    pub fn new(window: usize) -> Self {
        Self { window, sum: 0.0 }
    }

    /// Window length in samples.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Current sum.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Folds in the newest sample of `history` and returns the updated sum.
    ///
    /// `history` must be the complete stream so far, ending with the sample
    /// being added, and each call must extend the previous one by exactly
    /// one sample.
    #[inline]
    pub fn push(&mut self, history: &[f64]) -> f64 {
        let Some(&newest) = history.last() else {
            return self.sum;
        };
        self.sum += newest;
        let len = history.len();
        if len > self.window {
            self.sum -= history[len - 1 - self.window];
        }
        self.sum
    }

    /// Clears the accumulator.
    pub fn reset(&mut self) {
        self.sum = 0.0;
    }
}
