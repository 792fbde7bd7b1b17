//! Processing nodes: the leaf catalog and composites built from them.
//!
//! A [`Leaf`] owns a fixed set of role bindings plus its numeric state and
//! appends exactly one sample to each output per tick. A [`Composite`]
//! groups children and derives its stream namespace from theirs. Neither
//! holds edges: wiring is implied by matching stream names, and order is
//! derived from the readiness contract when a [`Graph`](crate::Graph) is
//! built.

mod composite;
mod leaf;

pub use composite::{Composite, Node};
pub use leaf::{Leaf, LeafKind};

use crate::store::{StreamId, StreamStore};

/// Stream handles for one leaf, in canonical role order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Ports {
    pub(crate) inputs: Vec<StreamId>,
    pub(crate) outputs: Vec<StreamId>,
    pub(crate) feedback: Vec<StreamId>,
}

impl Ports {
    /// Readiness of a leaf bound to these ports.
    pub(crate) fn ready(&self, store: &StreamStore) -> bool {
        synchronous(
            self.inputs.iter().map(|&id| store.len(id)),
            self.outputs.iter().chain(&self.feedback).map(|&id| store.len(id)),
        )
    }
}

/// The stream synchrony contract.
///
/// Holds when every input has the same length `L` and every lagging stream
/// (outputs and feedback inputs) has length `L - 1`. A node without inputs
/// is always ready.
pub(crate) fn synchronous(
    inputs: impl IntoIterator<Item = usize>,
    lagging: impl IntoIterator<Item = usize>,
) -> bool {
    let mut inputs = inputs.into_iter();
    let Some(first) = inputs.next() else {
        return true;
    };
    if !inputs.all(|len| len == first) {
        return false;
    }
    first >= 1 && lagging.into_iter().all(|len| len + 1 == first)
}
