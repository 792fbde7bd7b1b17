//! Construction-time execution ordering.
//!
//! Replays the bootstrap tick symbolically: streams that some leaf produces
//! start empty, external inputs start with one sample, and scheduling a leaf
//! adds one sample to each of its outputs. Leaves are scanned in declaration
//! order, repeatedly, until all are placed or a full pass places none.

use std::collections::{HashMap, HashSet};

use crate::graph::Slot;
use crate::node::synchronous;
use crate::GraphError;

/// Computes the execution order of `slots` as indices into the slice.
///
/// # Errors
///
/// [`GraphError::NoValidOrder`] when some leaves can never become ready,
/// which happens with cycles that lack feedback roles or with inputs that
/// nothing produces at the wrong lag.
pub(crate) fn bootstrap_order(slots: &[Slot]) -> Result<Vec<usize>, GraphError> {
    let produced: HashSet<&str> = slots
        .iter()
        .flat_map(|slot| slot.leaf.outputs())
        .map(|b| b.stream.as_str())
        .collect();
    let mut lengths: HashMap<&str, usize> = HashMap::new();
    let mut scheduled = vec![false; slots.len()];
    let mut order = Vec::with_capacity(slots.len());

    while order.len() < slots.len() {
        let before = order.len();
        for (index, slot) in slots.iter().enumerate() {
            if scheduled[index] {
                continue;
            }
            let len = |name: &str| symbolic_len(&lengths, &produced, name);
            let inputs = slot.leaf.inputs().iter().map(|b| len(&b.stream));
            let lagging = slot
                .leaf
                .outputs()
                .iter()
                .chain(slot.leaf.feedback())
                .map(|b| len(&b.stream));
            if synchronous(inputs, lagging) {
                for binding in slot.leaf.outputs() {
                    *lengths.entry(binding.stream.as_str()).or_insert(0) += 1;
                }
                scheduled[index] = true;
                order.push(index);
            }
        }
        if order.len() == before {
            let unscheduled = slots
                .iter()
                .zip(&scheduled)
                .filter(|(_, done)| !**done)
                .map(|(slot, _)| slot.path.clone())
                .collect();
            return Err(GraphError::NoValidOrder { unscheduled });
        }
    }
    Ok(order)
}

fn symbolic_len(lengths: &HashMap<&str, usize>, produced: &HashSet<&str>, name: &str) -> usize {
    lengths
        .get(name)
        .copied()
        .unwrap_or(usize::from(!produced.contains(name)))
}
