//! Transform and plan descriptors.

use core::fmt;
use core::str::FromStr;

use forma_core::{Composite, CrossingRule, GraphError};

use crate::error::ShapeError;
use crate::square::{square_graph, square_wave_biased};
use crate::triangle::{triangle_graph, triangle_wave_with};

/// One wave-shaping transform and its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Square approximation, switching at `-bias`.
    Square {
        /// Offset added before taking the sign.
        bias: f64,
    },
    /// Triangle approximation.
    Triangle {
        /// How crossings are detected.
        rule: CrossingRule,
    },
}

impl Transform {
    /// Square with zero bias.
    pub const SQUARE: Self = Transform::Square { bias: 0.0 };

    /// Triangle with the default crossing rule.
    pub const TRIANGLE: Self = Transform::Triangle {
        rule: CrossingRule::Disagreement,
    };

    /// Short label.
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Square { .. } => "square",
            Transform::Triangle { .. } => "triangle",
        }
    }

    /// Applies the transform to a whole signal.
    pub fn apply(&self, signal: &[f64], window: usize) -> Vec<f64> {
        match *self {
            Transform::Square { bias } => square_wave_biased(signal, window, bias),
            Transform::Triangle { rule } => triangle_wave_with(signal, window, rule),
        }
    }

    /// Builds the streaming form reading `input` and writing `output`.
    ///
    /// `time` is only read by transforms that differentiate.
    pub fn graph(
        &self,
        input: &str,
        output: &str,
        window: usize,
        time: &str,
    ) -> Result<Composite, GraphError> {
        match *self {
            Transform::Square { bias } => square_graph(input, output, window, bias),
            Transform::Triangle { rule } => triangle_graph(input, output, window, rule, time),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Square { bias } if *bias == 0.0 => f.write_str("square"),
            Transform::Square { bias } => write!(f, "square(bias={bias})"),
            Transform::Triangle {
                rule: CrossingRule::Disagreement,
            } => f.write_str("triangle"),
            Transform::Triangle { rule } => write!(f, "triangle({})", rule.name()),
        }
    }
}

impl FromStr for Transform {
    type Err = ShapeError;

    /// Parses `square`, `triangle`, or `triangle:sign-change`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Ok(Transform::SQUARE),
            "triangle" | "triangle:disagreement" => Ok(Transform::TRIANGLE),
            "triangle:sign-change" => Ok(Transform::Triangle {
                rule: CrossingRule::SignChange,
            }),
            other => Err(ShapeError::UnknownTransform(other.to_string())),
        }
    }
}

/// How transforms are chained into a decomposition.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// The same transform applied `passes` times to successive residuals.
    Iterative {
        /// The transform.
        transform: Transform,
        /// Number of passes.
        passes: usize,
    },
    /// A heterogeneous list applied in order to successive residuals.
    Combo(Vec<Transform>),
}

impl Default for Plan {
    /// Four square passes.
    fn default() -> Self {
        Plan::Iterative {
            transform: Transform::SQUARE,
            passes: 4,
        }
    }
}

impl Plan {
    /// The transform applied on each pass, in order.
    pub fn transforms(&self) -> Vec<Transform> {
        match self {
            Plan::Iterative { transform, passes } => vec![*transform; *passes],
            Plan::Combo(transforms) => transforms.clone(),
        }
    }

    /// Number of passes.
    pub fn passes(&self) -> usize {
        match self {
            Plan::Iterative { passes, .. } => *passes,
            Plan::Combo(transforms) => transforms.len(),
        }
    }

    /// Short label, e.g. `iterative_square_x4` or `combo_square_triangle`.
    pub fn label(&self) -> String {
        match self {
            Plan::Iterative { transform, passes } => {
                format!("iterative_{}_x{passes}", transform.name())
            }
            Plan::Combo(transforms) => {
                let names: Vec<&str> = transforms.iter().map(Transform::name).collect();
                format!("combo_{}", names.join("_"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_transforms() {
        assert_eq!("square".parse::<Transform>().unwrap(), Transform::SQUARE);
        assert_eq!(" Triangle ".parse::<Transform>().unwrap(), Transform::TRIANGLE);
        assert_eq!(
            "triangle:sign-change".parse::<Transform>().unwrap(),
            Transform::Triangle {
                rule: CrossingRule::SignChange
            }
        );
        assert!(matches!(
            "saw".parse::<Transform>(),
            Err(ShapeError::UnknownTransform(name)) if name == "saw"
        ));
    }

    #[test]
    fn display_round_trips_defaults() {
        for t in [Transform::SQUARE, Transform::TRIANGLE] {
            assert_eq!(t.to_string().parse::<Transform>().unwrap(), t);
        }
    }

    #[test]
    fn default_plan_is_four_squares() {
        let plan = Plan::default();
        assert_eq!(plan.passes(), 4);
        assert_eq!(plan.transforms(), vec![Transform::SQUARE; 4]);
        assert_eq!(plan.label(), "iterative_square_x4");
    }

    #[test]
    fn combo_label() {
        let plan = Plan::Combo(vec![Transform::SQUARE, Transform::TRIANGLE]);
        assert_eq!(plan.label(), "combo_square_triangle");
    }
}
