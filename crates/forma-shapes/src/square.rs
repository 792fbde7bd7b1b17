//! Square wave approximation.
//!
//! `out[i] = sign(x[i] + bias) * rms(x, W, i)`: the input's sign, held at
//! the input's local RMS level.

use forma_core::{Composite, GraphError, Leaf, Reduction, discretize};

use crate::rms::{rms_graph, sliding_rms};

/// Square approximation of `signal` with zero bias.
pub fn square_wave(signal: &[f64], window: usize) -> Vec<f64> {
    square_wave_biased(signal, window, 0.0)
}

/// Square approximation of `signal`, switching at `-bias` instead of zero.
pub fn square_wave_biased(signal: &[f64], window: usize, bias: f64) -> Vec<f64> {
    square_from_rms(signal, &sliding_rms(signal, window), bias)
}

pub(crate) fn square_from_rms(signal: &[f64], rms: &[f64], bias: f64) -> Vec<f64> {
    signal
        .iter()
        .zip(rms)
        .map(|(&x, &level)| Reduction::Product.reduce(&[level, discretize(x, bias)]))
        .collect()
}

/// Streaming form of [`square_wave_biased`].
pub fn square_graph(
    input: &str,
    output: &str,
    window: usize,
    bias: f64,
) -> Result<Composite, GraphError> {
    let part = |name: &str| format!("_square_{output}_{name}");
    let (sign, level) = (part("sign"), part("rms"));
    Composite::new(
        "square",
        vec![
            Leaf::discretizor(input, sign.as_str(), bias)?.into(),
            rms_graph(input, &level, window)?.into(),
            Leaf::multiplier(&[level.as_str(), sign.as_str()], output)?.into(),
        ],
    )
}
