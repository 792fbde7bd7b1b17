//! Residual decomposition: repeatedly fit a shape to what is left over.

/// Result of a decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    /// Sum of every pass's output.
    pub output: Vec<f64>,
    /// Input minus `output`, as left after the last pass.
    pub residual: Vec<f64>,
    /// Number of passes applied.
    pub passes: usize,
}

/// Applies `transform` `passes` times, each time to the previous residual.
///
/// ```rust
/// use forma_shapes::iterative_apply;
///
/// let halve = |s: &[f64]| s.iter().map(|x| x * 0.5).collect();
/// let result = iterative_apply(halve, &[8.0], 3);
/// assert_eq!(result.output, vec![7.0]);
/// assert_eq!(result.residual, vec![1.0]);
/// ```
pub fn iterative_apply<F>(mut transform: F, signal: &[f64], passes: usize) -> Decomposition
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    accumulate(signal, passes, |_, residual| transform(residual))
}

/// Applies each transform once, in order, each to the previous residual.
pub fn combo_apply<I, F>(transforms: I, signal: &[f64]) -> Decomposition
where
    I: IntoIterator<Item = F>,
    F: FnMut(&[f64]) -> Vec<f64>,
{
    let mut transforms: Vec<F> = transforms.into_iter().collect();
    let passes = transforms.len();
    accumulate(signal, passes, |pass, residual| (transforms[pass])(residual))
}

/// The shared residual loop; `stage(pass, residual)` yields that pass's piece.
pub(crate) fn accumulate(
    signal: &[f64],
    passes: usize,
    mut stage: impl FnMut(usize, &[f64]) -> Vec<f64>,
) -> Decomposition {
    let mut output = vec![0.0; signal.len()];
    let mut residual = signal.to_vec();
    for pass in 0..passes {
        let piece = stage(pass, &residual);
        debug_assert_eq!(piece.len(), residual.len(), "pass {pass} changed length");
        for ((acc, rest), p) in output.iter_mut().zip(residual.iter_mut()).zip(&piece) {
            *acc += p;
            *rest -= p;
        }
    }
    Decomposition {
        output,
        residual,
        passes,
    }
}
