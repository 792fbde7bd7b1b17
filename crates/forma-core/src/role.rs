//! Named roles that tie a node's ports to streams.
//!
//! Every node kind declares the roles it reads, writes, and feeds back.
//! A [`Bindings`] value maps each role to a stream name; leaf constructors
//! validate the mapping against the kind and store it in canonical order.

use core::fmt;

/// A port role on a processing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The primary input signal.
    Signal,
    /// The time axis stream.
    Time,
    /// The n-th operand of an aggregating node.
    Operand(usize),
    /// The primary output.
    Output,
    /// The n-th channel emitted by an input feeder.
    Channel(usize),
    /// The crossing flag emitted by a direction tracker.
    Flag,
    /// The held direction emitted by a direction tracker.
    Direction,
    /// The n-th feedback stream, read one tick late.
    Feedback(usize),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Signal => f.write_str("signal"),
            Role::Time => f.write_str("time"),
            Role::Operand(i) => write!(f, "operand[{i}]"),
            Role::Output => f.write_str("output"),
            Role::Channel(i) => write!(f, "channel[{i}]"),
            Role::Flag => f.write_str("flag"),
            Role::Direction => f.write_str("direction"),
            Role::Feedback(i) => write!(f, "feedback[{i}]"),
        }
    }
}

/// One role bound to one stream name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The port role.
    pub role: Role,
    /// The stream the port reads or writes.
    pub stream: String,
}

impl Binding {
    /// Creates a binding.
    pub fn new(role: Role, stream: impl Into<String>) -> Self {
        Self {
            role,
            stream: stream.into(),
        }
    }
}

/// Role-to-stream mappings for a node, grouped by port direction.
///
/// # Example
///
/// ```rust
/// use forma_core::{Bindings, Role};
///
/// let bindings = Bindings::new()
///     .input(Role::Signal, "x")
///     .input(Role::Time, "time")
///     .output(Role::Output, "dx");
/// assert_eq!(bindings.inputs().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    inputs: Vec<Binding>,
    outputs: Vec<Binding>,
    feedback: Vec<Binding>,
}

impl Bindings {
    /// Creates an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds an input role.
    #[must_use]
    pub fn input(mut self, role: Role, stream: impl Into<String>) -> Self {
        self.inputs.push(Binding::new(role, stream));
        self
    }

    /// Binds an output role.
    #[must_use]
    pub fn output(mut self, role: Role, stream: impl Into<String>) -> Self {
        self.outputs.push(Binding::new(role, stream));
        self
    }

    /// Binds a feedback role.
    #[must_use]
    pub fn feedback(mut self, role: Role, stream: impl Into<String>) -> Self {
        self.feedback.push(Binding::new(role, stream));
        self
    }

    /// Input bindings in insertion order.
    pub fn inputs(&self) -> &[Binding] {
        &self.inputs
    }

    /// Output bindings in insertion order.
    pub fn outputs(&self) -> &[Binding] {
        &self.outputs
    }

    /// Feedback bindings in insertion order.
    pub fn feedback_bindings(&self) -> &[Binding] {
        &self.feedback
    }
}

/// Reorders `given` to match `expected`, failing on missing or extra roles.
pub(crate) fn canonicalize(
    node: &'static str,
    expected: &[Role],
    given: &[Binding],
) -> Result<Vec<Binding>, crate::GraphError> {
    let mut ordered = Vec::with_capacity(expected.len());
    for role in expected {
        let binding = given
            .iter()
            .find(|b| b.role == *role)
            .ok_or(crate::GraphError::BindingNotFound { node, role: *role })?;
        ordered.push(binding.clone());
    }
    if let Some(extra) = given.iter().find(|b| !expected.contains(&b.role)) {
        return Err(crate::GraphError::UnexpectedBinding {
            node,
            role: extra.role,
        });
    }
    if given.len() != expected.len() {
        // A role bound twice; report the first repeat.
        let repeated = given
            .iter()
            .enumerate()
            .find(|(i, b)| given[..*i].iter().any(|p| p.role == b.role))
            .map_or(Role::Output, |(_, b)| b.role);
        return Err(crate::GraphError::UnexpectedBinding {
            node,
            role: repeated,
        });
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphError;

    #[test]
    fn canonical_order_follows_expected_roles() {
        let given = vec![Binding::new(Role::Time, "t"), Binding::new(Role::Signal, "x")];
        let ordered = canonicalize("Derivative", &[Role::Signal, Role::Time], &given).unwrap();
        assert_eq!(ordered[0].stream, "x");
        assert_eq!(ordered[1].stream, "t");
    }

    #[test]
    fn missing_role_is_reported() {
        let given = vec![Binding::new(Role::Signal, "x")];
        let err = canonicalize("Derivative", &[Role::Signal, Role::Time], &given).unwrap_err();
        assert_eq!(
            err,
            GraphError::BindingNotFound {
                node: "Derivative",
                role: Role::Time
            }
        );
    }

    #[test]
    fn extra_role_is_reported() {
        let given = vec![Binding::new(Role::Signal, "x"), Binding::new(Role::Flag, "f")];
        let err = canonicalize("Exponent", &[Role::Signal], &given).unwrap_err();
        assert!(matches!(
            err,
            GraphError::UnexpectedBinding {
                role: Role::Flag,
                ..
            }
        ));
    }

    #[test]
    fn repeated_role_is_reported() {
        let given = vec![Binding::new(Role::Signal, "x"), Binding::new(Role::Signal, "y")];
        let err = canonicalize("Exponent", &[Role::Signal], &given).unwrap_err();
        assert!(matches!(
            err,
            GraphError::UnexpectedBinding {
                role: Role::Signal,
                ..
            }
        ));
    }

    #[test]
    fn role_display() {
        assert_eq!(Role::Operand(2).to_string(), "operand[2]");
        assert_eq!(Role::Feedback(0).to_string(), "feedback[0]");
    }
}
