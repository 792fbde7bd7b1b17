//! Reductions used by aggregating leaves.

/// How an aggregator combines its operand values into one sample.
///
/// Operands arrive in canonical order, followed by any feedback values.
#[derive(Debug, Clone, Copy)]
pub enum Reduction {
    /// Product of all values, folded from `1.0`.
    Product,
    /// Sum of all values, folded from `0.0`, plus a constant offset.
    Sum {
        /// Added after the fold.
        constant: f64,
    },
    /// First value minus every later value.
    Difference,
    /// Caller-supplied reduction.
    Custom {
        /// Label used in diagnostics.
        name: &'static str,
        /// The reduction.
        func: fn(&[f64]) -> f64,
    },
}

impl Reduction {
    /// Reduces `values` to one sample.
    #[inline]
    pub fn reduce(&self, values: &[f64]) -> f64 {
        match self {
            Reduction::Product => values.iter().fold(1.0, |acc, v| acc * v),
            Reduction::Sum { constant } => values.iter().fold(0.0, |acc, v| acc + v) + constant,
            Reduction::Difference => match values.split_first() {
                Some((first, rest)) => rest.iter().fold(*first, |acc, v| acc - v),
                None => 0.0,
            },
            Reduction::Custom { func, .. } => func(values),
        }
    }

    /// Short label.
    pub fn name(&self) -> &'static str {
        match self {
            Reduction::Product => "product",
            Reduction::Sum { .. } => "sum",
            Reduction::Difference => "difference",
            Reduction::Custom { name, .. } => name,
        }
    }
}
