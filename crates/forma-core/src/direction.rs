//! Direction tracking and crossing detection for slope-following shapes.

use crate::math::sign;

/// How a direction tracker decides a crossing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossingRule {
    /// A crossing is any sample whose slope does not strictly agree with
    /// the held direction. Zero slopes count and leave the direction as is.
    #[default]
    Disagreement,
    /// A crossing is a strict sign flip between consecutive slope samples.
    /// A zero on either side is not a crossing.
    SignChange,
}

impl CrossingRule {
    /// Short label.
    pub fn name(self) -> &'static str {
        match self {
            CrossingRule::Disagreement => "disagreement",
            CrossingRule::SignChange => "sign-change",
        }
    }
}

/// Holds the current direction of a signal and flags crossings.
///
/// The direction starts at `+1` and only changes on a non-zero slope.
///
/// ## Example
///
/// ```rust
/// use forma_core::{CrossingRule, DirectionTracker};
///
/// let mut tracker = DirectionTracker::new(CrossingRule::Disagreement);
/// assert!(!tracker.step(0.5));
/// assert!(tracker.step(-0.5));
/// assert_eq!(tracker.direction(), -1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DirectionTracker {
    rule: CrossingRule,
    direction: f64,
    previous_sign: f64,
}

impl DirectionTracker {
    /// Create a tracker with the given crossing rule.
    pub fn new(rule: CrossingRule) -> Self {
        Self {
            rule,
            direction: 1.0,
            previous_sign: 0.0,
        }
    }

    /// The crossing rule in use.
    pub fn rule(&self) -> CrossingRule {
        self.rule
    }

    /// Current held direction, `1.0` or `-1.0`.
    pub fn direction(&self) -> f64 {
        self.direction
    }

    /// Feeds one slope sample and reports whether it is a crossing.
    ///
    /// Only the sign of `slope` matters.
    #[inline]
    pub fn step(&mut self, slope: f64) -> bool {
        let s = sign(slope);
        let crossing = match self.rule {
            CrossingRule::Disagreement => self.direction * slope <= 0.0 || slope.is_nan(),
            CrossingRule::SignChange => s * self.previous_sign < 0.0,
        };
        if s == 1.0 || s == -1.0 {
            self.direction = s;
        }
        self.previous_sign = s;
        crossing
    }

    /// Restores the initial direction.
    pub fn reset(&mut self) {
        self.direction = 1.0;
        self.previous_sign = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(rule: CrossingRule, slopes: &[f64]) -> Vec<bool> {
        let mut tracker = DirectionTracker::new(rule);
        slopes.iter().map(|&d| tracker.step(d)).collect()
    }

    #[test]
    fn disagreement_counts_zero_slopes() {
        let got = flags(CrossingRule::Disagreement, &[1.0, 0.0, 1.0, -1.0, -1.0]);
        assert_eq!(got, vec![false, true, false, true, false]);
    }

    #[test]
    fn disagreement_holds_direction_on_zero() {
        let mut tracker = DirectionTracker::new(CrossingRule::Disagreement);
        tracker.step(-2.0);
        tracker.step(0.0);
        assert_eq!(tracker.direction(), -1.0);
    }

    #[test]
    fn initial_negative_slope_is_a_crossing() {
        assert_eq!(flags(CrossingRule::Disagreement, &[-1.0]), vec![true]);
    }

    #[test]
    fn sign_change_ignores_zeros() {
        let got = flags(CrossingRule::SignChange, &[1.0, 0.0, -1.0, -1.0, 1.0]);
        assert_eq!(got, vec![false, false, false, false, true]);
    }

    #[test]
    fn reset_restores_upward_direction() {
        let mut tracker = DirectionTracker::new(CrossingRule::SignChange);
        tracker.step(-1.0);
        tracker.reset();
        assert_eq!(tracker.direction(), 1.0);
        assert!(!tracker.step(-1.0));
    }
}
