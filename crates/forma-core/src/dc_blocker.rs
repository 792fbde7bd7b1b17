//! DC blocking filter for removing drift from integrated signals.
//!
//! Uses a first-order highpass filter (Julius O. Smith's DC blocker).
//! Transfer function: H(z) = (1 - z^-1) / (1 - alpha*z^-1)
//!
//! Reference: Julius O. Smith, "Introduction to Digital Filters with Audio
//! Applications", Chapter on DC Blocker.

/// DC blocking filter using a first-order highpass.
///
/// ## Parameters
/// - `alpha`: pole position in `[0, 1)`; `0.995` is the default
///
/// The -3 dB cutoff frequency is: f_c = (1 - alpha) / (2 * pi) * f_s
///
/// ## Example
///
/// ```rust
/// use forma_core::DcBlocker;
///
/// let mut blocker = DcBlocker::default();
/// let out: Vec<f64> = [1.0, 1.0, 1.0].iter().map(|&x| blocker.process(x)).collect();
/// assert_eq!(out[0], 1.0);
/// assert!(out[2] < out[1]);
/// ```
#[derive(Debug, Clone)]
pub struct DcBlocker {
    alpha: f64,
    /// Previous input sample x[n-1]
    x_prev: f64,
    /// Previous output sample y[n-1]
    y_prev: f64,
}

impl Default for DcBlocker {
    fn default() -> Self {
        Self::with_alpha(Self::DEFAULT_ALPHA)
    }
}

impl DcBlocker {
    /// Pole position used when none is given.
    pub const DEFAULT_ALPHA: f64 = 0.995;

    /// Create a DC blocker with pole `alpha`.
    ///
    /// Callers are expected to pass a value in `[0, 1)`; leaf construction
    /// rejects anything else.
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            x_prev: 0.0,
            y_prev: 0.0,
        }
    }

    /// Process a single sample.
    ///
    /// Implements: y[n] = x[n] - x[n-1] + alpha * y[n-1]
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = input - self.x_prev + self.alpha * self.y_prev;
        self.x_prev = input;
        self.y_prev = output;
        output
    }

    /// Filter a whole signal from a cleared state.
    pub fn process_all(&mut self, signal: &[f64]) -> Vec<f64> {
        self.reset();
        signal.iter().map(|&x| self.process(x)).collect()
    }

    /// Reset the filter state to zero.
    pub fn reset(&mut self) {
        self.x_prev = 0.0;
        self.y_prev = 0.0;
    }

    /// The pole position.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::PI;

    #[test]
    fn test_dc_blocker_removes_dc() {
        let mut blocker = DcBlocker::default();
        let mut output = 0.0;
        for _ in 0..20_000 {
            output = blocker.process(1.0);
        }
        assert!(output.abs() < 0.01, "DC should be removed, got {output}");
    }

    #[test]
    fn test_dc_blocker_passes_ac() {
        let mut blocker = DcBlocker::default();
        let freq = 1000.0;
        let sample_rate = 48000.0;

        for i in 0..48000 {
            let t = f64::from(i) / sample_rate;
            blocker.process((2.0 * PI * freq * t).sin());
        }

        let mut max_output = 0.0f64;
        for i in 0..48 {
            let t = f64::from(48000 + i) / sample_rate;
            let output = blocker.process((2.0 * PI * freq * t).sin());
            max_output = max_output.max(output.abs());
        }
        assert!(max_output > 0.95, "1 kHz should pass through, max output was {max_output}");
    }

    #[test]
    fn test_dc_blocker_first_sample_passes() {
        let mut blocker = DcBlocker::default();
        assert_eq!(blocker.process(0.25), 0.25);
        assert_eq!(blocker.process(0.25), 0.995 * 0.25);
    }

    #[test]
    fn test_dc_blocker_reset() {
        let mut blocker = DcBlocker::default();
        for _ in 0..1000 {
            blocker.process(1.0);
        }
        blocker.reset();
        assert_eq!(blocker.x_prev, 0.0);
        assert_eq!(blocker.y_prev, 0.0);
    }

    #[test]
    fn test_process_all_resets_first() {
        let mut blocker = DcBlocker::default();
        let a = blocker.process_all(&[1.0, 0.5, -0.5]);
        let b = blocker.process_all(&[1.0, 0.5, -0.5]);
        assert_eq!(a, b);
    }
}
