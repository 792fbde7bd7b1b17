//! Scalar math shared by the batch procedures and the streaming leaves.
//!
//! Batch and streaming paths call the same functions in the same order, so
//! the two produce bitwise-identical samples.

/// Three-way sign: `1.0`, `-1.0`, or `0.0` for zero. NaN maps to NaN.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else if x.is_nan() {
        f64::NAN
    } else {
        0.0
    }
}

/// Sign of `x + bias`.
#[inline]
pub fn discretize(x: f64, bias: f64) -> f64 {
    sign(x + bias)
}

/// Raises `x` to `exponent`.
///
/// The common exponents `2`, `1`, `-1`, and `0.5` take exact fast paths.
/// A fractional power of a negative base has no real value and yields `0.0`.
#[inline]
pub fn power(x: f64, exponent: f64) -> f64 {
    if exponent == 2.0 {
        x * x
    } else if exponent == 1.0 {
        x
    } else if exponent == -1.0 {
        1.0 / x
    } else if x < 0.0 && exponent.fract() != 0.0 {
        0.0
    } else if exponent == 0.5 {
        x.sqrt()
    } else {
        x.powf(exponent)
    }
}

/// Number of samples a trailing window of size `window` covers once `len`
/// samples exist.
#[inline]
pub fn effective_window(len: usize, window: usize) -> f64 {
    len.min(window) as f64
}

/// Element-wise transfer curve applied by a map leaf.
#[derive(Debug, Clone, Copy)]
pub enum MapFn {
    /// `1.0` where the sample is non-zero, else `0.0`.
    NonZero,
    /// Negative samples clamp to zero.
    Rectify,
    /// Absolute value.
    Abs,
    /// Caller-supplied curve.
    Custom {
        /// Label used in diagnostics.
        name: &'static str,
        /// The curve.
        func: fn(f64) -> f64,
    },
}

impl MapFn {
    /// Applies the curve to one sample.
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            MapFn::NonZero => {
                if x == 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            MapFn::Rectify => x.max(0.0),
            MapFn::Abs => x.abs(),
            MapFn::Custom { func, .. } => func(x),
        }
    }

    /// Short label.
    pub fn name(&self) -> &'static str {
        match self {
            MapFn::NonZero => "non_zero",
            MapFn::Rectify => "rectify",
            MapFn::Abs => "abs",
            MapFn::Custom { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_three_way() {
        assert_eq!(sign(3.5), 1.0);
        assert_eq!(sign(-0.1), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert!(sign(f64::NAN).is_nan());
    }

    #[test]
    fn discretize_applies_bias() {
        assert_eq!(discretize(0.2, -0.5), -1.0);
        assert_eq!(discretize(-0.2, 0.5), 1.0);
        assert_eq!(discretize(-0.5, 0.5), 0.0);
    }

    #[test]
    fn power_fast_paths() {
        assert_eq!(power(3.0, 2.0), 9.0);
        assert_eq!(power(4.0, -1.0), 0.25);
        assert_eq!(power(9.0, 0.5), 3.0);
        assert_eq!(power(-7.0, 1.0), -7.0);
        assert_eq!(power(2.0, 3.0), 8.0);
    }

    #[test]
    fn power_of_negative_base() {
        assert_eq!(power(-4.0, 0.5), 0.0);
        assert_eq!(power(-2.0, 3.0), -8.0);
        assert_eq!(power(-3.0, 2.0), 9.0);
    }

    #[test]
    fn effective_window_caps_at_window() {
        assert_eq!(effective_window(3, 10), 3.0);
        assert_eq!(effective_window(30, 10), 10.0);
    }

    #[test]
    fn map_curves() {
        assert_eq!(MapFn::NonZero.apply(-2.0), 1.0);
        assert_eq!(MapFn::NonZero.apply(0.0), 0.0);
        assert_eq!(MapFn::Rectify.apply(-2.0), 0.0);
        assert_eq!(MapFn::Abs.apply(-2.0), 2.0);
        let double = MapFn::Custom {
            name: "double",
            func: |x| 2.0 * x,
        };
        assert_eq!(double.apply(1.5), 3.0);
        assert_eq!(double.name(), "double");
    }
}
