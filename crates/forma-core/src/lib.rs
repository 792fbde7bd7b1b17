//! Forma Core - stream graph engine for causal wave shaping
//!
//! This crate provides the engine that drives small graphs of stateful
//! stream-processing nodes forward one sample at a time, plus the scalar
//! kernels those nodes share with offline (whole-array) procedures.
//!
//! # Core Abstractions
//!
//! ## Streams
//!
//! - [`StreamStore`] - Named, append-only `f64` sequences; the only shared state
//! - [`StreamId`] - Handle to a stream, resolved once per store
//!
//! ## Nodes
//!
//! - [`Leaf`] - One processing unit from the closed [`LeafKind`] catalog
//! - [`Role`] / [`Bindings`] - Validated mapping of ports to stream names
//! - [`Composite`] - Group of nodes whose namespace is derived from its children
//! - [`Graph`] - Flattened node tree with an execution order fixed at construction
//!
//! ## Kernels
//!
//! - [`RunningSum`] - O(1) trailing-window sum
//! - [`DcBlocker`] - One-pole DC blocking highpass
//! - [`DirectionTracker`] - Held direction with crossing detection
//! - [`WindowFn`] / [`Reduction`] / [`MapFn`] - Window, aggregate, and element-wise functions
//!
//! # The Synchrony Contract
//!
//! A node is ready when all of its inputs have the same length `L` and all
//! of its outputs and feedback inputs have length `L - 1`. Processing a
//! ready node appends exactly one sample to each output, which restores the
//! invariant for the next tick. Nodes without inputs are sources and are
//! always ready.
//!
//! # Example
//!
//! ```rust
//! use forma_core::{Composite, Graph, Leaf, StreamStore};
//!
//! let graph = Composite::new(
//!     "sign_of_sine",
//!     vec![
//!         Leaf::time_counter("time", 8.0).unwrap().into(),
//!         Leaf::input_feeder([("x".to_string(), vec![0.0, 1.0, 0.0, -1.0])]).unwrap().into(),
//!         Leaf::discretizor("x", "sign", 0.0).unwrap().into(),
//!     ],
//! )
//! .unwrap();
//! let mut graph = Graph::new(graph).unwrap();
//! let mut store = StreamStore::new();
//! graph.run(&mut store, 4).unwrap();
//! assert_eq!(store.samples("sign").unwrap(), &[0.0, 1.0, 0.0, -1.0]);
//! ```
//!
//! # Logging
//!
//! Enable the `tracing` feature to log composite construction, the computed
//! execution order, and store attachment at `debug` level.

pub mod dc_blocker;
pub mod direction;
pub mod error;
pub mod graph;
pub mod math;
pub mod node;
pub mod reduction;
pub mod role;
pub mod running_sum;
pub mod store;
pub mod window;

pub use dc_blocker::DcBlocker;
pub use direction::{CrossingRule, DirectionTracker};
pub use error::GraphError;
pub use graph::Graph;
pub use math::{MapFn, discretize, effective_window, power, sign};
pub use node::{Composite, Leaf, LeafKind, Node};
pub use reduction::Reduction;
pub use role::{Binding, Bindings, Role};
pub use running_sum::RunningSum;
pub use store::{StreamId, StreamStore};
pub use window::{WindowFn, apply_sliding};
