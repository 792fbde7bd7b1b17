//! Test signals and time axes.

use core::f64::consts::TAU;

/// `len` evenly spaced instants from `0` to `len / sample_rate`, inclusive.
pub fn time_axis(len: usize, sample_rate: f64) -> Vec<f64> {
    let stop = len as f64 / sample_rate;
    linspace(0.0, stop, len)
}

fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num).map(|i| start + i as f64 * step).collect()
        }
    }
}

/// Sum of `amplitude * sin(2*pi*freq*t)` over `partials`, for `duration` seconds.
pub fn tones(partials: &[(f64, f64)], duration: f64, sample_rate: f64) -> Vec<f64> {
    let len = (duration * sample_rate).round().max(0.0) as usize;
    linspace(0.0, duration, len)
        .into_iter()
        .map(|t| {
            partials
                .iter()
                .map(|(freq, amplitude)| amplitude * (TAU * freq * t).sin())
                .sum()
        })
        .collect()
}

/// `2 sin(2 pi 100 t) + 3 sin(2 pi 200 t) + 4 sin(2 pi 300 t)`.
pub fn three_tone(duration: f64, sample_rate: f64) -> Vec<f64> {
    tones(&[(100.0, 2.0), (200.0, 3.0), (300.0, 4.0)], duration, sample_rate)
}
