//! Reductions over a trailing window of samples.

/// Function applied to the trailing window of a fixed-window leaf.
#[derive(Debug, Clone, Copy)]
pub enum WindowFn {
    /// Root mean square.
    Rms,
    /// Arithmetic mean.
    Mean,
    /// Mean of absolute values.
    AbsMean,
    /// Mean of the strictly positive samples, `0` if there are none.
    MeanPositive,
    /// Mean of the strictly negative samples, `0` if there are none.
    MeanNegative,
    /// Caller-supplied reduction.
    Custom {
        /// Label used in diagnostics and memo keys.
        name: &'static str,
        /// The reduction.
        func: fn(&[f64]) -> f64,
    },
}

/// Guards the one-sided means against an empty side.
const SIDE_EPSILON: f64 = 1e-5;

impl WindowFn {
    /// Reduces `window` (oldest first) to one value.
    ///
    /// An empty window reduces to `0.0` for the built-in reductions.
    pub fn reduce(&self, window: &[f64]) -> f64 {
        let n = window.len() as f64;
        match self {
            WindowFn::Rms => {
                if window.is_empty() {
                    0.0
                } else {
                    (window.iter().map(|x| x * x).sum::<f64>() / n).sqrt()
                }
            }
            WindowFn::Mean => {
                if window.is_empty() {
                    0.0
                } else {
                    window.iter().sum::<f64>() / n
                }
            }
            WindowFn::AbsMean => {
                if window.is_empty() {
                    0.0
                } else {
                    window.iter().map(|x| x.abs()).sum::<f64>() / n
                }
            }
            WindowFn::MeanPositive => one_sided_mean(window.iter().copied().filter(|&x| x > 0.0)),
            WindowFn::MeanNegative => one_sided_mean(window.iter().copied().filter(|&x| x < 0.0)),
            WindowFn::Custom { func, .. } => func(window),
        }
    }

    /// Short label.
    pub fn name(&self) -> &'static str {
        match self {
            WindowFn::Rms => "rms",
            WindowFn::Mean => "mean",
            WindowFn::AbsMean => "abs_mean",
            WindowFn::MeanPositive => "mean_positive",
            WindowFn::MeanNegative => "mean_negative",
            WindowFn::Custom { name, .. } => name,
        }
    }
}

fn one_sided_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), x| (s + x, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / (count as f64 + SIDE_EPSILON)
    }
}

/// Applies `func` to every trailing window of `signal`.
///
/// Sample `i` of the result reduces `signal[i + 1 - min(window, i + 1)..=i]`,
/// so the first windows grow until they reach full size.
pub fn apply_sliding(signal: &[f64], window: usize, func: WindowFn) -> Vec<f64> {
    let window = window.max(1);
    (0..signal.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            func.reduce(&signal[start..=i])
        })
        .collect()
}
