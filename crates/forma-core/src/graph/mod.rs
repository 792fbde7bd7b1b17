//! Flattened, pre-scheduled node graphs.
//!
//! [`Graph::new`] flattens a node tree into an arena of leaves and fixes the
//! execution order once, by replaying the readiness scan against a symbolic
//! model of the first tick. After that every [`tick`](Graph::tick) simply
//! runs the leaves in that order.
//!
//! # Store attachment
//!
//! A graph holds stream names, not data. The first tick against a store
//! resolves every name to a [`StreamId`](crate::StreamId), registering empty
//! output streams as needed. Ticking against a different store re-resolves
//! and resets every leaf, so one graph can be replayed from time zero.
//!
//! # Example
//!
//! ```rust
//! use forma_core::{Composite, Graph, Leaf, StreamStore};
//!
//! let mean = Composite::new(
//!     "mean",
//!     vec![
//!         Leaf::running_sum("x", "sum", 2).unwrap().into(),
//!         Leaf::functional_window_length("x", "len", 2).unwrap().into(),
//!         Leaf::exponent("len", "inv", -1.0).unwrap().into(),
//!         Leaf::multiplier(&["sum", "inv"], "mean").unwrap().into(),
//!     ],
//! )
//! .unwrap();
//! let mut graph = Graph::new(mean).unwrap();
//!
//! let mut store = StreamStore::new();
//! let x = store.get_or_create("x");
//! for value in [2.0, 4.0, 6.0] {
//!     store.append(x, value);
//!     graph.tick(&mut store).unwrap();
//! }
//! assert_eq!(store.samples("mean").unwrap(), &[2.0, 3.0, 5.0]);
//! ```

mod schedule;

use crate::GraphError;
use crate::node::{Leaf, Node, Ports, synchronous};
use crate::store::{StreamId, StreamStore};

/// One leaf in the flattened arena.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    /// `/`-separated composite labels ending in the leaf label.
    pub(crate) path: String,
    pub(crate) leaf: Leaf,
    pub(crate) ports: Ports,
}

/// A node tree flattened into leaves with a fixed execution order.
#[derive(Debug, Clone)]
pub struct Graph {
    slots: Vec<Slot>,
    order: Vec<usize>,
    inputs: Vec<String>,
    outputs: Vec<String>,
    input_ids: Vec<StreamId>,
    output_ids: Vec<StreamId>,
    attached: Option<u64>,
    ticks: u64,
}

impl Graph {
    /// Flattens `root` and computes its execution order.
    ///
    /// # Errors
    ///
    /// [`GraphError::NoValidOrder`] if some leaf can never become ready.
    pub fn new(root: impl Into<Node>) -> Result<Self, GraphError> {
        let root = root.into();
        let inputs = root.inputs().into_iter().map(str::to_string).collect();
        let outputs = root.outputs().into_iter().map(str::to_string).collect();

        let mut slots = Vec::with_capacity(root.leaf_count());
        flatten(root, "", &mut slots);
        let order = schedule::bootstrap_order(&slots)?;

        #[cfg(feature = "tracing")]
        {
            tracing::debug!("graph_sort: {} leaves in execution order", order.len());
            for (i, &index) in order.iter().enumerate() {
                tracing::debug!("  step[{i}]: {}", slots[index].path);
            }
        }

        Ok(Self {
            slots,
            order,
            inputs,
            outputs,
            input_ids: Vec::new(),
            output_ids: Vec::new(),
            attached: None,
            ticks: 0,
        })
    }

    /// Streams the driver must supply, one sample per tick.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Streams the graph writes.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the graph has no leaves. Always false for a constructed graph.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Leaf paths in execution order.
    pub fn execution_order(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|&index| self.slots[index].path.as_str())
            .collect()
    }

    /// Ticks completed since construction or the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Resolves stream names against `store`.
    ///
    /// Output streams are created if absent. Inputs that no leaf produces
    /// must already exist. Attaching to a store other than the current one
    /// resets every leaf. Re-attaching to the current store is a no-op.
    ///
    /// # Errors
    ///
    /// [`GraphError::StreamNotFound`] for an external input missing from
    /// `store`.
    pub fn attach(&mut self, store: &mut StreamStore) -> Result<(), GraphError> {
        if self.attached == Some(store.identity()) {
            return Ok(());
        }
        for slot in &self.slots {
            for binding in slot.leaf.outputs() {
                store.get_or_create(&binding.stream);
            }
        }
        let resolve = |store: &StreamStore, bindings: &[crate::Binding]| {
            bindings
                .iter()
                .map(|b| {
                    store
                        .id_of(&b.stream)
                        .ok_or_else(|| GraphError::StreamNotFound(b.stream.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        };
        let mut resolved = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            resolved.push(Ports {
                inputs: resolve(store, slot.leaf.inputs())?,
                outputs: resolve(store, slot.leaf.outputs())?,
                feedback: resolve(store, slot.leaf.feedback())?,
            });
        }
        for (slot, ports) in self.slots.iter_mut().zip(resolved) {
            slot.ports = ports;
        }
        self.input_ids = resolve_names(store, &self.inputs)?;
        self.output_ids = resolve_names(store, &self.outputs)?;

        if self.attached.is_some() {
            self.reset();
        }
        self.attached = Some(store.identity());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_attach: store {} with {} streams",
            store.identity(),
            store.stream_count()
        );
        Ok(())
    }

    /// Whether the graph's external inputs are one sample ahead of its outputs.
    ///
    /// Pure: never creates streams. A missing input means not ready; a
    /// missing output counts as empty.
    pub fn ready(&self, store: &StreamStore) -> bool {
        let mut inputs = Vec::with_capacity(self.inputs.len());
        for name in &self.inputs {
            match store.id_of(name) {
                Some(id) => inputs.push(store.len(id)),
                None => return false,
            }
        }
        let outputs = self
            .outputs
            .iter()
            .map(|name| store.id_of(name).map_or(0, |id| store.len(id)));
        synchronous(inputs, outputs)
    }

    /// Runs every leaf once, in execution order.
    ///
    /// Attaches to `store` first if needed. The caller must have appended
    /// exactly one new sample to each external input since the last tick.
    ///
    /// # Errors
    ///
    /// Attachment errors, [`GraphError::NotReady`] when the inputs are not
    /// one sample ahead (nothing is written then), or
    /// [`GraphError::InputExhausted`] from a feeder.
    pub fn tick(&mut self, store: &mut StreamStore) -> Result<(), GraphError> {
        self.attach(store)?;
        let in_sync = synchronous(
            self.input_ids.iter().map(|&id| store.len(id)),
            self.output_ids.iter().map(|&id| store.len(id)),
        );
        if !in_sync {
            return Err(GraphError::NotReady { tick: self.ticks });
        }
        for &index in &self.order {
            let slot = &mut self.slots[index];
            debug_assert!(
                slot.ports.ready(store),
                "leaf {} scheduled out of sync",
                slot.path
            );
            slot.leaf.process(store, &slot.ports)?;
        }
        self.ticks += 1;
        Ok(())
    }

    /// Ticks `ticks` times. Only useful when every input comes from a leaf.
    ///
    /// # Errors
    ///
    /// The first error returned by [`tick`](Self::tick).
    pub fn run(&mut self, store: &mut StreamStore, ticks: usize) -> Result<(), GraphError> {
        for _ in 0..ticks {
            self.tick(store)?;
        }
        Ok(())
    }

    /// Restores every leaf to its construction-time state.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.leaf.reset();
        }
        self.ticks = 0;
    }
}

fn resolve_names(store: &StreamStore, names: &[String]) -> Result<Vec<StreamId>, GraphError> {
    names
        .iter()
        .map(|name| {
            store
                .id_of(name)
                .ok_or_else(|| GraphError::StreamNotFound(name.clone()))
        })
        .collect()
}

fn flatten(node: Node, prefix: &str, slots: &mut Vec<Slot>) {
    match node {
        Node::Leaf(leaf) => slots.push(Slot {
            path: join(prefix, &leaf.label()),
            leaf,
            ports: Ports::default(),
        }),
        Node::Composite(composite) => {
            let prefix = join(prefix, composite.label());
            for child in composite.into_children() {
                flatten(child, &prefix, slots);
            }
        }
    }
}

fn join(prefix: &str, label: &str) -> String {
    if prefix.is_empty() {
        label.to_string()
    } else {
        format!("{prefix}/{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Composite, Reduction};

    fn chain() -> Composite {
        // Declared out of dependency order on purpose.
        Composite::new(
            "chain",
            vec![
                Leaf::exponent("b", "c", 2.0).unwrap().into(),
                Leaf::exponent("a", "b", 2.0).unwrap().into(),
                Leaf::time_counter("a", 1.0).unwrap().into(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_order_follows_dependencies() {
        let graph = Graph::new(chain()).unwrap();
        assert_eq!(
            graph.execution_order(),
            vec![
                "chain/TimeCounter->a",
                "chain/Exponent->b",
                "chain/Exponent->c"
            ]
        );
    }

    #[test]
    fn test_order_is_deterministic() {
        let a = Graph::new(chain()).unwrap();
        let b = Graph::new(chain()).unwrap();
        assert_eq!(a.execution_order(), b.execution_order());
    }

    #[test]
    fn test_cycle_without_feedback_fails() {
        let cyclic = Composite::new(
            "cycle",
            vec![
                Leaf::exponent("y", "x", 1.0).unwrap().into(),
                Leaf::exponent("x", "y", 1.0).unwrap().into(),
            ],
        )
        .unwrap();
        let err = Graph::new(cyclic).unwrap_err();
        match err {
            GraphError::NoValidOrder { unscheduled } => assert_eq!(unscheduled.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_external_input_must_exist() {
        let mut graph = Graph::new(Leaf::exponent("x", "y", 2.0).unwrap()).unwrap();
        let mut store = StreamStore::new();
        let err = graph.tick(&mut store).unwrap_err();
        assert_eq!(err, GraphError::StreamNotFound("x".to_string()));
    }

    #[test]
    fn test_attach_registers_outputs() {
        let mut graph = Graph::new(chain()).unwrap();
        let mut store = StreamStore::new();
        assert!(graph.ready(&store));
        graph.attach(&mut store).unwrap();
        for name in ["a", "b", "c"] {
            assert!(store.contains(name), "{name}");
        }
    }

    #[test]
    fn test_ready_tracks_lag() {
        let mut graph = Graph::new(Leaf::exponent("x", "y", 2.0).unwrap()).unwrap();
        let mut store = StreamStore::new();
        assert!(!graph.ready(&store));
        let x = store.seed("x", [3.0]);
        assert!(graph.ready(&store));
        graph.tick(&mut store).unwrap();
        assert!(!graph.ready(&store));
        store.append(x, 4.0);
        assert!(graph.ready(&store));
    }

    #[test]
    fn test_tick_without_new_input_fails() {
        let mut graph = Graph::new(Leaf::exponent("x", "y", 2.0).unwrap()).unwrap();
        let mut store = StreamStore::new();
        let x = store.seed("x", [3.0]);
        graph.tick(&mut store).unwrap();
        let err = graph.tick(&mut store).unwrap_err();
        assert_eq!(err, GraphError::NotReady { tick: 1 });
        assert_eq!(store.samples("y").unwrap(), &[9.0]);
        store.append(x, 4.0);
        graph.tick(&mut store).unwrap();
        assert_eq!(store.samples("y").unwrap(), &[9.0, 16.0]);
    }

    #[test]
    fn test_uneven_inputs_write_nothing() {
        let mut graph = Graph::new(Leaf::derivative("x", "t", "dx").unwrap()).unwrap();
        let mut store = StreamStore::new();
        store.seed("x", [1.0, 2.0]);
        store.seed("t", [0.0]);
        let err = graph.tick(&mut store).unwrap_err();
        assert_eq!(err, GraphError::NotReady { tick: 0 });
        assert!(store.samples("dx").unwrap().is_empty());
    }

    #[test]
    fn test_reattach_resets_state() {
        let mut graph = Graph::new(chain()).unwrap();
        let mut first = StreamStore::new();
        graph.run(&mut first, 3).unwrap();
        let mut second = StreamStore::new();
        graph.run(&mut second, 3).unwrap();
        assert_eq!(first.samples("c").unwrap(), second.samples("c").unwrap());
        assert_eq!(graph.ticks(), 3);
    }

    #[test]
    fn test_feedback_schedules_after_inputs() {
        let integrator = Composite::new(
            "integrator",
            vec![
                Leaf::aggregator_with_feedback(&["step"], &["acc"], "acc", Reduction::Sum { constant: 0.0 })
                    .unwrap()
                    .into(),
                Leaf::summer(&["t"], "step", 1.0).unwrap().into(),
                Leaf::time_counter("t", 1.0).unwrap().into(),
            ],
        )
        .unwrap();
        let mut graph = Graph::new(integrator).unwrap();
        let mut store = StreamStore::new();
        graph.run(&mut store, 4).unwrap();
        // step = t + 1 = 1, 2, 3, 4
        assert_eq!(store.samples("acc").unwrap(), &[1.0, 3.0, 6.0, 10.0]);
    }

    #[test]
    fn test_nested_paths() {
        let inner = Composite::new("inner", vec![Leaf::exponent("x", "y", 2.0).unwrap().into()]).unwrap();
        let outer = Composite::new("outer", vec![inner.into()]).unwrap();
        let graph = Graph::new(outer).unwrap();
        assert_eq!(graph.execution_order(), vec!["outer/inner/Exponent->y"]);
        assert_eq!(graph.inputs(), &["x"]);
        assert_eq!(graph.outputs(), &["y"]);
        assert_eq!(graph.len(), 1);
    }
}
