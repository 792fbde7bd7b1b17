//! Triangle wave approximation.
//!
//! The shape integrates a slope whose sign follows the input's direction
//! and whose magnitude scales with the local RMS and the local density of
//! direction changes:
//!
//! ```text
//! slope[i] = rms[i] * 2*sqrt(3) * crossings[i] / min(W, i)
//! raw[i]   = raw[i-1] + direction[i] * slope[i]
//! out[i]   = dcblock(raw)[i] * clip(rms[i] / (rms(dcblock(raw))[i] + 1e-9), 0, 10)
//! ```
//!
//! A crossing is decided by a [`CrossingRule`]; the default flags every
//! sample whose slope does not strictly agree with the held direction.

use std::collections::VecDeque;

use forma_core::{
    Composite, CrossingRule, DcBlocker, DirectionTracker, GraphError, Leaf, Reduction,
};

use crate::rms::{rms_graph, sliding_rms};

/// Peak slope of a unit-RMS triangle per crossing density, `2 * sqrt(3)`.
pub const SLOPE_FACTOR: f64 = 3.464_101_615_137_754_6;

/// Pole of the DC blocker that removes integration drift.
pub const DC_BLOCK_ALPHA: f64 = 0.995;

/// Guards the rescale division against a silent filtered signal.
pub const RESCALE_EPSILON: f64 = 1e-9;

/// Upper bound of the rescale gain.
pub const MAX_RESCALE_GAIN: f64 = 10.0;

/// `clip(target_rms / (own_rms + 1e-9), 0, 10)`.
pub fn rescale_gain(target_rms: f64, own_rms: f64) -> f64 {
    (target_rms / (own_rms + RESCALE_EPSILON)).clamp(0.0, MAX_RESCALE_GAIN)
}

/// Integration step from `[direction, rms, crossings, norm]`.
///
/// Zero while the normalising window is still empty.
fn slope_step(values: &[f64]) -> f64 {
    match values {
        [direction, rms, crossings, norm] if *norm != 0.0 => {
            direction * (rms * SLOPE_FACTOR * crossings / norm)
        }
        _ => 0.0,
    }
}

/// Rescaled output from `[filtered, target_rms, filtered_rms]`.
fn rescale(values: &[f64]) -> f64 {
    match values {
        [filtered, target, own] => filtered * rescale_gain(*target, *own),
        _ => 0.0,
    }
}

/// Bounded FIFO of crossing flags with a running count.
struct CrossingWindow {
    flags: VecDeque<bool>,
    capacity: usize,
    count: usize,
}

impl CrossingWindow {
    fn new(capacity: usize) -> Self {
        Self {
            flags: VecDeque::with_capacity(capacity + 1),
            capacity,
            count: 0,
        }
    }

    fn push(&mut self, flag: bool) {
        self.flags.push_back(flag);
        self.count += usize::from(flag);
        if self.flags.len() > self.capacity && self.flags.pop_front() == Some(true) {
            self.count -= 1;
        }
    }

    fn count(&self) -> usize {
        self.count
    }
}

/// Triangle approximation of `signal` using the default crossing rule.
pub fn triangle_wave(signal: &[f64], window: usize) -> Vec<f64> {
    triangle_wave_with(signal, window, CrossingRule::Disagreement)
}

/// Triangle approximation of `signal` using `rule` to detect crossings.
///
/// A window of 0 is treated as 1.
pub fn triangle_wave_with(signal: &[f64], window: usize, rule: CrossingRule) -> Vec<f64> {
    let rms = sliding_rms(signal, window);
    triangle_from_rms(signal, &rms, window, rule, |filtered| {
        sliding_rms(filtered, window)
    })
}

/// Core loop with the windowed RMS supplied by the caller, so a memo can
/// provide both RMS passes.
pub(crate) fn triangle_from_rms(
    signal: &[f64],
    rms: &[f64],
    window: usize,
    rule: CrossingRule,
    filtered_rms: impl FnOnce(&[f64]) -> Vec<f64>,
) -> Vec<f64> {
    let window = window.max(1);
    let mut tracker = DirectionTracker::new(rule);
    let mut crossings = CrossingWindow::new(window);
    let integrate = Reduction::Sum { constant: 0.0 };

    let mut raw = Vec::with_capacity(signal.len());
    let mut previous = 0.0;
    for i in 0..signal.len() {
        if i >= 1 {
            crossings.push(tracker.step(backward_difference(signal, i - 1)));
        }
        let norm = i.min(window) as f64;
        let step = slope_step(&[tracker.direction(), rms[i], crossings.count() as f64, norm]);
        previous = integrate.reduce(&[step, previous]);
        raw.push(previous);
    }

    let filtered = DcBlocker::with_alpha(DC_BLOCK_ALPHA).process_all(&raw);
    let own_rms = filtered_rms(&filtered);
    filtered
        .iter()
        .zip(rms)
        .zip(&own_rms)
        .map(|((&f, &target), &own)| rescale(&[f, target, own]))
        .collect()
}

/// Causal slope at `j`; zero at the first sample.
fn backward_difference(signal: &[f64], j: usize) -> f64 {
    if j == 0 { 0.0 } else { signal[j] - signal[j - 1] }
}

/// Streaming form of [`triangle_wave_with`].
///
/// Needs a `time` stream alongside `input` to differentiate against.
pub fn triangle_graph(
    input: &str,
    output: &str,
    window: usize,
    rule: CrossingRule,
    time: &str,
) -> Result<Composite, GraphError> {
    let part = |name: &str| format!("_triangle_{output}_{name}");
    let slope = part("slope");
    let slope_sign = part("slope_sign");
    let flag = part("flag");
    let direction = part("direction");
    let crossings = part("crossings");
    let span = part("span");
    let norm = part("norm");
    let level = part("rms");
    let step = part("step");
    let raw = part("raw");
    let filtered = part("filtered");
    let filtered_level = part("filtered_rms");

    Composite::new(
        "triangle",
        vec![
            Leaf::derivative(input, time, slope.as_str())?.into(),
            Leaf::discretizor(slope.as_str(), slope_sign.as_str(), 0.0)?.into(),
            Leaf::direction_tracker(slope_sign.as_str(), flag.as_str(), direction.as_str(), rule)?
                .into(),
            Leaf::running_sum(flag.as_str(), crossings.as_str(), window)?.into(),
            Leaf::functional_window_length(flag.as_str(), span.as_str(), window.saturating_add(1))?
                .into(),
            Leaf::summer(&[span.as_str()], norm.as_str(), -1.0)?.into(),
            rms_graph(input, &level, window)?.into(),
            Leaf::aggregator(
                &[
                    direction.as_str(),
                    level.as_str(),
                    crossings.as_str(),
                    norm.as_str(),
                ],
                step.as_str(),
                Reduction::Custom {
                    name: "triangle_step",
                    func: slope_step,
                },
            )?
            .into(),
            Leaf::aggregator_with_feedback(
                &[step.as_str()],
                &[raw.as_str()],
                raw.as_str(),
                Reduction::Sum { constant: 0.0 },
            )?
            .into(),
            Leaf::highpass_dc_block(raw.as_str(), filtered.as_str(), DC_BLOCK_ALPHA)?.into(),
            rms_graph(&filtered, &filtered_level, window)?.into(),
            Leaf::aggregator(
                &[filtered.as_str(), level.as_str(), filtered_level.as_str()],
                output,
                Reduction::Custom {
                    name: "rescale",
                    func: rescale,
                },
            )?
            .into(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slope_factor_is_two_root_three() {
        assert!((SLOPE_FACTOR - 2.0 * 3f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn gain_is_clamped() {
        assert_eq!(rescale_gain(0.0, 0.0), 0.0);
        assert_eq!(rescale_gain(1.0, 0.0), MAX_RESCALE_GAIN);
        assert!((rescale_gain(1.0, 2.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn slope_step_zero_norm() {
        assert_eq!(slope_step(&[1.0, 2.0, 3.0, 0.0]), 0.0);
        assert_eq!(slope_step(&[-1.0, 1.0, 1.0, 1.0]), -SLOPE_FACTOR);
    }

    #[test]
    fn crossing_window_evicts() {
        let mut window = CrossingWindow::new(2);
        window.push(true);
        window.push(true);
        assert_eq!(window.count(), 2);
        window.push(false);
        assert_eq!(window.count(), 1);
        window.push(false);
        assert_eq!(window.count(), 0);
    }

    #[test]
    fn first_sample_is_zero() {
        let out = triangle_wave(&[0.7, 0.2, -0.4, 0.9], 4);
        assert_eq!(out[0], 0.0);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn silence_stays_silent() {
        let out = triangle_wave(&[0.0; 64], 8);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn output_level_tracks_input_level() {
        let signal: Vec<f64> = (0..20_000)
            .map(|n| (core::f64::consts::TAU * 100.0 * n as f64 / 44100.0).sin())
            .collect();
        let out = triangle_wave(&signal, 4410);
        let tail = &out[10_000..];
        let rms = (tail.iter().map(|v| v * v).sum::<f64>() / tail.len() as f64).sqrt();
        assert!(rms > 0.2 && rms < 2.0, "rms {rms}");
    }

    #[test]
    fn crossing_rules_disagree_on_flat_slopes() {
        let signal = [0.0, 1.0, 1.0, 2.0, 1.0, 0.0, 0.0, -1.0];
        let a = triangle_wave_with(&signal, 4, CrossingRule::Disagreement);
        let b = triangle_wave_with(&signal, 4, CrossingRule::SignChange);
        assert_eq!(a.len(), b.len());
        assert_ne!(a, b);
    }
}
