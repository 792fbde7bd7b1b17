//! Sliding mean and RMS over a growing-then-fixed trailing window.
//!
//! Both the whole-array functions and the graph builders compute
//! `mean = running_sum * (1 / min(len, W))` with the same kernels in the
//! same order, so they agree sample for sample.

use forma_core::{Composite, GraphError, Leaf, Reduction, RunningSum, effective_window, power};

/// Trailing mean of `signal`; the first `window - 1` outputs average fewer samples.
///
/// A window of 0 is treated as 1.
pub fn sliding_mean(signal: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut sum = RunningSum::new(window);
    (0..signal.len())
        .map(|i| {
            let total = sum.push(&signal[..=i]);
            let inverse = power(effective_window(i + 1, window), -1.0);
            Reduction::Product.reduce(&[total, inverse])
        })
        .collect()
}

/// Trailing RMS of `signal`.
///
/// A window of 0 is treated as 1.
pub fn sliding_rms(signal: &[f64], window: usize) -> Vec<f64> {
    let squares: Vec<f64> = signal.iter().map(|&x| power(x, 2.0)).collect();
    sliding_mean(&squares, window)
        .into_iter()
        .map(|mean| power(mean, 0.5))
        .collect()
}

/// Streaming form of [`sliding_mean`]: reads `input`, writes `output`.
pub fn mean_graph(input: &str, output: &str, window: usize) -> Result<Composite, GraphError> {
    let part = |name: &str| format!("_mean_{output}_{name}");
    let (sum, len, inverse) = (part("sum"), part("len"), part("inverse"));
    Composite::new(
        "mean",
        vec![
            Leaf::running_sum(input, sum.as_str(), window)?.into(),
            Leaf::functional_window_length(input, len.as_str(), window)?.into(),
            Leaf::exponent(len.as_str(), inverse.as_str(), -1.0)?.into(),
            Leaf::multiplier(&[sum.as_str(), inverse.as_str()], output)?.into(),
        ],
    )
}

/// Streaming form of [`sliding_rms`]: reads `input`, writes `output`.
pub fn rms_graph(input: &str, output: &str, window: usize) -> Result<Composite, GraphError> {
    let part = |name: &str| format!("_rms_{output}_{name}");
    let (square, mean) = (part("square"), part("mean"));
    Composite::new(
        "rms",
        vec![
            Leaf::exponent(input, square.as_str(), 2.0)?.into(),
            mean_graph(&square, &mean, window)?.into(),
            Leaf::exponent(mean.as_str(), output, 0.5)?.into(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_core::{Graph, StreamStore, WindowFn, apply_sliding};

    fn stream(graph: Composite, signal: &[f64]) -> Vec<f64> {
        let mut graph = Graph::new(graph).unwrap();
        let mut store = StreamStore::new();
        let x = store.get_or_create("x");
        for &value in signal {
            store.append(x, value);
            graph.tick(&mut store).unwrap();
        }
        store.samples("y").unwrap().to_vec()
    }

    fn wobble(len: usize) -> Vec<f64> {
        (0..len).map(|i| ((i * 7919) % 113) as f64 / 56.0 - 1.0).collect()
    }

    #[test]
    fn mean_warms_up() {
        assert_eq!(sliding_mean(&[2.0, 4.0, 6.0, 8.0], 2), vec![2.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn rms_of_constant_magnitude() {
        let out = sliding_rms(&[-3.0, 3.0, -3.0, 3.0], 3);
        for value in out {
            assert!((value - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn rms_close_to_direct_rms() {
        let signal = wobble(500);
        let direct = apply_sliding(&signal, 37, WindowFn::Rms);
        for (a, b) in sliding_rms(&signal, 37).iter().zip(&direct) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn zero_window_behaves_as_one() {
        assert_eq!(sliding_rms(&[-2.0, 5.0], 0), vec![2.0, 5.0]);
    }

    #[test]
    fn mean_graph_matches_batch() {
        let signal = wobble(300);
        assert_eq!(stream(mean_graph("x", "y", 16).unwrap(), &signal), sliding_mean(&signal, 16));
    }

    #[test]
    fn rms_graph_matches_batch() {
        let signal = wobble(300);
        assert_eq!(stream(rms_graph("x", "y", 16).unwrap(), &signal), sliding_rms(&signal, 16));
    }

    #[test]
    fn rms_graph_rejects_zero_window() {
        assert!(rms_graph("x", "y", 0).is_err());
    }
}
