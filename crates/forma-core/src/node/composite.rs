//! Composite nodes.

use std::collections::HashSet;

use crate::node::Leaf;
use crate::GraphError;

/// Either a leaf or a composite; the unit a [`Composite`] is built from.
#[derive(Debug, Clone)]
pub enum Node {
    /// A single processing leaf.
    Leaf(Leaf),
    /// A nested group of nodes.
    Composite(Composite),
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<Composite> for Node {
    fn from(composite: Composite) -> Self {
        Node::Composite(composite)
    }
}

impl Node {
    /// Streams this node reads but does not itself produce, in first-use order.
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Node::Leaf(leaf) => {
                let own: Vec<&str> = leaf.outputs().iter().map(|b| b.stream.as_str()).collect();
                dedup(leaf.reads().filter(|name| !own.contains(name)))
            }
            Node::Composite(composite) => composite.inputs.iter().map(String::as_str).collect(),
        }
    }

    /// Streams this node writes, in declaration order.
    pub fn outputs(&self) -> Vec<&str> {
        match self {
            Node::Leaf(leaf) => leaf.outputs().iter().map(|b| b.stream.as_str()).collect(),
            Node::Composite(composite) => composite.outputs.iter().map(String::as_str).collect(),
        }
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Composite(composite) => composite.children.iter().map(Node::leaf_count).sum(),
        }
    }
}

fn dedup<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    names.filter(|name| seen.insert(*name)).collect()
}

/// A group of child nodes treated as one node.
///
/// The composite's outputs are the union of its children's outputs; its
/// inputs are every stream a child reads that no child writes. No edges are
/// stored: children are wired by stream name alone.
///
/// ## Example
///
/// ```rust
/// use forma_core::{Composite, Leaf};
///
/// let squares = Composite::new(
///     "mean_square",
///     vec![
///         Leaf::exponent("x", "x2", 2.0).unwrap().into(),
///         Leaf::running_sum("x2", "sum", 4).unwrap().into(),
///     ],
/// )
/// .unwrap();
/// assert_eq!(squares.inputs(), &["x".to_string()]);
/// assert_eq!(squares.outputs(), &["x2".to_string(), "sum".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct Composite {
    label: String,
    children: Vec<Node>,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl Composite {
    /// Groups `children` under `label`.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateOutput`] if two children write the same stream,
    /// [`GraphError::EmptyComposite`] if there are no children.
    pub fn new(label: impl Into<String>, children: Vec<Node>) -> Result<Self, GraphError> {
        let label = label.into();
        if children.is_empty() {
            return Err(GraphError::EmptyComposite { label });
        }

        let mut outputs = Vec::new();
        let mut written = HashSet::new();
        for child in &children {
            for name in child.outputs() {
                if !written.insert(name) {
                    return Err(GraphError::DuplicateOutput {
                        stream: name.to_string(),
                    });
                }
                outputs.push(name.to_string());
            }
        }

        let inputs: Vec<String> = dedup(
            children
                .iter()
                .flat_map(Node::inputs)
                .filter(|name| !written.contains(name)),
        )
        .into_iter()
        .map(str::to_string)
        .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "composite_new: '{label}' with {} children, {} inputs, {} outputs",
            children.len(),
            inputs.len(),
            outputs.len()
        );

        Ok(Self {
            label,
            children,
            inputs,
            outputs,
        })
    }

    /// Label used in execution-order paths.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Streams read from outside the composite.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Streams written by any child.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Child nodes in declaration order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn into_children(self) -> Vec<Node> {
        self.children
    }
}
