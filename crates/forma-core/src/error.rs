//! Error types for graph construction and execution.

use thiserror::Error;

use crate::role::Role;

/// Errors raised while building, scheduling, or running a node graph.
///
/// Every variant is a wiring or configuration defect. None of them are
/// transient, so callers should surface them instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A stream is written by two children of one composite, or by two
    /// output roles of one leaf.
    #[error("duplicate output stream '{stream}'")]
    DuplicateOutput {
        /// The contested stream name.
        stream: String,
    },

    /// A node kind requires a role that was not bound to a stream.
    #[error("{node} has no binding for role {role}")]
    BindingNotFound {
        /// Kind of the node being constructed.
        node: &'static str,
        /// The missing role.
        role: Role,
    },

    /// A binding names a role the node kind does not support.
    #[error("{node} does not accept a binding for role {role}")]
    UnexpectedBinding {
        /// Kind of the node being constructed.
        node: &'static str,
        /// The unsupported role.
        role: Role,
    },

    /// A numeric parameter is outside the range the node kind accepts.
    #[error("invalid parameter for {node}: {reason}")]
    InvalidParameter {
        /// Kind of the node being constructed.
        node: &'static str,
        /// Description of the violated constraint.
        reason: String,
    },

    /// A composite was built without children.
    #[error("composite '{label}' has no children")]
    EmptyComposite {
        /// Label of the empty composite.
        label: String,
    },

    /// The readiness scan stalled before every leaf was scheduled.
    ///
    /// Indicates a dependency cycle or an input that nothing produces.
    #[error("no valid execution order; unschedulable: {}", unscheduled.join(", "))]
    NoValidOrder {
        /// Paths of the leaves that never became ready.
        unscheduled: Vec<String>,
    },

    /// A stream is referenced that no node produces and the driver never seeded.
    #[error("stream '{0}' not found")]
    StreamNotFound(String),

    /// An input feeder ran past the end of its pre-supplied samples.
    #[error("input feeder exhausted on stream '{stream}' after {index} samples")]
    InputExhausted {
        /// Stream whose source array ran out.
        stream: String,
        /// Number of samples already emitted.
        index: usize,
    },

    /// A tick was requested before every external input received its sample.
    #[error("inputs not one sample ahead of outputs at tick {tick}")]
    NotReady {
        /// Ticks completed before the failed one.
        tick: u64,
    },
}
