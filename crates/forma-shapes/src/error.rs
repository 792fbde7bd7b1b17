//! Error types for wave shaping and decomposition.

use forma_core::GraphError;
use thiserror::Error;

/// Errors raised while building or running shape transforms.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// Graph construction or execution failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A window of zero samples was requested.
    #[error("window must be at least one sample")]
    InvalidWindow,

    /// The sample rate is not a positive finite number.
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(f64),

    /// A plan applies no transforms.
    #[error("plan has no passes")]
    EmptyPlan,

    /// A transform name could not be parsed.
    #[error("unknown transform '{0}' (expected 'square' or 'triangle')")]
    UnknownTransform(String),
}

/// Convenience result type for shape operations.
pub type Result<T> = std::result::Result<T, ShapeError>;
