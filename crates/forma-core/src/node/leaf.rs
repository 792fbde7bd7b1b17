//! Leaf processing nodes.

use std::sync::Arc;

use crate::dc_blocker::DcBlocker;
use crate::direction::{CrossingRule, DirectionTracker};
use crate::math::{MapFn, discretize, effective_window, power};
use crate::node::Ports;
use crate::reduction::Reduction;
use crate::role::{Binding, Bindings, Role, canonicalize};
use crate::running_sum::RunningSum;
use crate::store::{StreamId, StreamStore};
use crate::window::WindowFn;
use crate::GraphError;

/// The closed catalog of leaf behaviours, with each kind's numeric state.
#[derive(Debug, Clone)]
pub enum LeafKind {
    /// Discrete slope of a signal against a time stream.
    Derivative,
    /// Trailing-window sum.
    RunningSum(RunningSum),
    /// Number of samples a trailing window currently covers.
    FunctionalWindowLength {
        /// Window length in samples.
        window: usize,
    },
    /// Sign of the latest sample plus a bias.
    Discretizor {
        /// Added before taking the sign.
        bias: f64,
    },
    /// Latest sample raised to a power.
    Exponent {
        /// The power.
        exponent: f64,
    },
    /// Element-wise transfer curve.
    Map(MapFn),
    /// Reduction over the latest operand values and previous own outputs.
    Aggregator {
        /// How values combine.
        reduction: Reduction,
        /// Number of operand roles.
        operands: usize,
        /// Number of feedback roles.
        feedback: usize,
    },
    /// Clock source: emits elapsed seconds, then advances.
    TimeCounter {
        /// Seconds per tick.
        interval: f64,
        /// Seconds emitted on the next tick.
        elapsed: f64,
    },
    /// Replays pre-supplied arrays, one sample per channel per tick.
    InputFeeder {
        /// Source arrays, one per channel.
        channels: Vec<Arc<[f64]>>,
        /// Next sample to emit.
        index: usize,
    },
    /// One-pole DC blocking highpass.
    HighpassDcBlock(DcBlocker),
    /// Reduction over a trailing window.
    FixedWindow {
        /// Window length in samples.
        window: usize,
        /// The reduction.
        func: WindowFn,
    },
    /// Held direction and crossing flag of a sign stream.
    DirectionTracker(DirectionTracker),
}

impl LeafKind {
    /// Short kind name, used in errors and execution-order labels.
    pub fn name(&self) -> &'static str {
        match self {
            LeafKind::Derivative => "Derivative",
            LeafKind::RunningSum(_) => "RunningSum",
            LeafKind::FunctionalWindowLength { .. } => "FunctionalWindowLength",
            LeafKind::Discretizor { .. } => "Discretizor",
            LeafKind::Exponent { .. } => "Exponent",
            LeafKind::Map(_) => "Map",
            LeafKind::Aggregator { reduction, .. } => match reduction {
                Reduction::Product => "Multiplier",
                Reduction::Sum { .. } => "Summer",
                Reduction::Difference | Reduction::Custom { .. } => "Aggregator",
            },
            LeafKind::TimeCounter { .. } => "TimeCounter",
            LeafKind::InputFeeder { .. } => "InputFeeder",
            LeafKind::HighpassDcBlock(_) => "HighpassDcBlock",
            LeafKind::FixedWindow { .. } => "FixedWindowGeneric",
            LeafKind::DirectionTracker(_) => "DirectionTracker",
        }
    }

    /// Input roles in canonical order.
    pub fn input_roles(&self) -> Vec<Role> {
        match self {
            LeafKind::Derivative => vec![Role::Signal, Role::Time],
            LeafKind::Aggregator { operands, .. } => (0..*operands).map(Role::Operand).collect(),
            LeafKind::TimeCounter { .. } | LeafKind::InputFeeder { .. } => Vec::new(),
            _ => vec![Role::Signal],
        }
    }

    /// Output roles in canonical order.
    pub fn output_roles(&self) -> Vec<Role> {
        match self {
            LeafKind::TimeCounter { .. } => vec![Role::Time],
            LeafKind::InputFeeder { channels, .. } => (0..channels.len()).map(Role::Channel).collect(),
            LeafKind::DirectionTracker(_) => vec![Role::Flag, Role::Direction],
            _ => vec![Role::Output],
        }
    }

    /// Feedback roles in canonical order.
    pub fn feedback_roles(&self) -> Vec<Role> {
        match self {
            LeafKind::Aggregator { feedback, .. } => (0..*feedback).map(Role::Feedback).collect(),
            _ => Vec::new(),
        }
    }

    fn validate(&self) -> Result<(), GraphError> {
        let invalid = |reason: &str| {
            Err(GraphError::InvalidParameter {
                node: self.name(),
                reason: reason.to_string(),
            })
        };
        match self {
            LeafKind::RunningSum(sum) if sum.window() == 0 => invalid("window must be at least 1"),
            LeafKind::FunctionalWindowLength { window } | LeafKind::FixedWindow { window, .. }
                if *window == 0 =>
            {
                invalid("window must be at least 1")
            }
            LeafKind::Discretizor { bias } if !bias.is_finite() => invalid("bias must be finite"),
            LeafKind::Exponent { exponent } if !exponent.is_finite() => {
                invalid("exponent must be finite")
            }
            LeafKind::Aggregator {
                operands: 0,
                feedback: 0,
                ..
            } => invalid("at least one operand is required"),
            LeafKind::TimeCounter { interval, .. } if !(interval.is_finite() && *interval > 0.0) => {
                invalid("sample rate must be positive")
            }
            LeafKind::InputFeeder { channels, .. } if channels.is_empty() => {
                invalid("at least one channel is required")
            }
            LeafKind::HighpassDcBlock(filter) if !(0.0..1.0).contains(&filter.alpha()) => {
                invalid("alpha must lie in [0, 1)")
            }
            _ => Ok(()),
        }
    }

    /// Returns numeric state to its construction-time value.
    pub fn reset(&mut self) {
        match self {
            LeafKind::RunningSum(sum) => sum.reset(),
            LeafKind::TimeCounter { elapsed, .. } => *elapsed = 0.0,
            LeafKind::InputFeeder { index, .. } => *index = 0,
            LeafKind::HighpassDcBlock(filter) => filter.reset(),
            LeafKind::DirectionTracker(tracker) => tracker.reset(),
            LeafKind::Derivative
            | LeafKind::FunctionalWindowLength { .. }
            | LeafKind::Discretizor { .. }
            | LeafKind::Exponent { .. }
            | LeafKind::Map(_)
            | LeafKind::Aggregator { .. }
            | LeafKind::FixedWindow { .. } => {}
        }
    }
}

/// A leaf processing node: one [`LeafKind`] plus validated role bindings.
///
/// On each tick the leaf reads the newest sample of every input (and the
/// previous tick's value of every feedback stream) and appends exactly one
/// sample to each output.
///
/// ## Example
///
/// ```rust
/// use forma_core::{Graph, Leaf, StreamStore};
///
/// let leaf = Leaf::running_sum("x", "sum", 2).unwrap();
/// let mut graph = Graph::new(leaf).unwrap();
/// let mut store = StreamStore::new();
/// let x = store.seed("x", [1.0]);
/// graph.tick(&mut store).unwrap();
/// store.append(x, 2.0);
/// graph.tick(&mut store).unwrap();
/// assert_eq!(store.samples("sum").unwrap(), &[1.0, 3.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Leaf {
    kind: LeafKind,
    inputs: Vec<Binding>,
    outputs: Vec<Binding>,
    feedback: Vec<Binding>,
    scratch: Vec<f64>,
}

impl Leaf {
    /// Builds a leaf from a kind and explicit bindings.
    ///
    /// Bindings are checked against the kind's roles and stored in
    /// canonical order.
    ///
    /// # Errors
    ///
    /// [`GraphError::BindingNotFound`] for a required role with no binding,
    /// [`GraphError::UnexpectedBinding`] for a role the kind does not have,
    /// [`GraphError::InvalidParameter`] for an out-of-range parameter.
    pub fn from_parts(kind: LeafKind, bindings: &Bindings) -> Result<Self, GraphError> {
        kind.validate()?;
        let node = kind.name();
        let inputs = canonicalize(node, &kind.input_roles(), bindings.inputs())?;
        let outputs = canonicalize(node, &kind.output_roles(), bindings.outputs())?;
        // One append per output per tick needs distinct output streams.
        for (i, binding) in outputs.iter().enumerate() {
            if outputs[..i].iter().any(|p| p.stream == binding.stream) {
                return Err(GraphError::DuplicateOutput {
                    stream: binding.stream.clone(),
                });
            }
        }
        let feedback = canonicalize(node, &kind.feedback_roles(), bindings.feedback_bindings())?;
        Ok(Self {
            scratch: Vec::with_capacity(inputs.len() + feedback.len()),
            kind,
            inputs,
            outputs,
            feedback,
        })
    }

    /// `d signal / d time` by backward difference; the first sample is `0`.
    pub fn derivative(
        signal: impl Into<String>,
        time: impl Into<String>,
        output: impl Into<String>,
    ) -> Result<Self, GraphError> {
        let bindings = Bindings::new()
            .input(Role::Signal, signal)
            .input(Role::Time, time)
            .output(Role::Output, output);
        Self::from_parts(LeafKind::Derivative, &bindings)
    }

    /// Sum of the last `window` samples.
    pub fn running_sum(
        signal: impl Into<String>,
        output: impl Into<String>,
        window: usize,
    ) -> Result<Self, GraphError> {
        Self::unary(LeafKind::RunningSum(RunningSum::new(window)), signal, output)
    }

    /// `min(history length, window)`.
    pub fn functional_window_length(
        signal: impl Into<String>,
        output: impl Into<String>,
        window: usize,
    ) -> Result<Self, GraphError> {
        Self::unary(LeafKind::FunctionalWindowLength { window }, signal, output)
    }

    /// `sign(x + bias)`.
    pub fn discretizor(
        signal: impl Into<String>,
        output: impl Into<String>,
        bias: f64,
    ) -> Result<Self, GraphError> {
        Self::unary(LeafKind::Discretizor { bias }, signal, output)
    }

    /// `x ^ exponent`.
    pub fn exponent(
        signal: impl Into<String>,
        output: impl Into<String>,
        exponent: f64,
    ) -> Result<Self, GraphError> {
        Self::unary(LeafKind::Exponent { exponent }, signal, output)
    }

    /// `f(x)` for an element-wise curve.
    pub fn map(
        signal: impl Into<String>,
        output: impl Into<String>,
        func: MapFn,
    ) -> Result<Self, GraphError> {
        Self::unary(LeafKind::Map(func), signal, output)
    }

    /// One-pole DC blocker with pole `alpha`.
    pub fn highpass_dc_block(
        signal: impl Into<String>,
        output: impl Into<String>,
        alpha: f64,
    ) -> Result<Self, GraphError> {
        Self::unary(LeafKind::HighpassDcBlock(DcBlocker::with_alpha(alpha)), signal, output)
    }

    /// `func` over the last `min(window, history)` samples.
    pub fn fixed_window(
        signal: impl Into<String>,
        output: impl Into<String>,
        window: usize,
        func: WindowFn,
    ) -> Result<Self, GraphError> {
        Self::unary(LeafKind::FixedWindow { window, func }, signal, output)
    }

    /// Reduction over several operands.
    pub fn aggregator(
        operands: &[&str],
        output: impl Into<String>,
        reduction: Reduction,
    ) -> Result<Self, GraphError> {
        Self::aggregator_with_feedback(operands, &[], output, reduction)
    }

    /// Reduction over several operands followed by previous values of
    /// `feedback` streams (`0` before the first value exists).
    pub fn aggregator_with_feedback(
        operands: &[&str],
        feedback: &[&str],
        output: impl Into<String>,
        reduction: Reduction,
    ) -> Result<Self, GraphError> {
        let mut bindings = Bindings::new().output(Role::Output, output);
        for (i, name) in operands.iter().enumerate() {
            bindings = bindings.input(Role::Operand(i), *name);
        }
        for (i, name) in feedback.iter().enumerate() {
            bindings = bindings.feedback(Role::Feedback(i), *name);
        }
        let kind = LeafKind::Aggregator {
            reduction,
            operands: operands.len(),
            feedback: feedback.len(),
        };
        Self::from_parts(kind, &bindings)
    }

    /// Product of the operands.
    pub fn multiplier(operands: &[&str], output: impl Into<String>) -> Result<Self, GraphError> {
        Self::aggregator(operands, output, Reduction::Product)
    }

    /// Sum of the operands plus `constant`.
    pub fn summer(
        operands: &[&str],
        output: impl Into<String>,
        constant: f64,
    ) -> Result<Self, GraphError> {
        Self::aggregator(operands, output, Reduction::Sum { constant })
    }

    /// Clock emitting `0, 1/sample_rate, 2/sample_rate, ...`.
    pub fn time_counter(output: impl Into<String>, sample_rate: f64) -> Result<Self, GraphError> {
        let kind = LeafKind::TimeCounter {
            interval: 1.0 / sample_rate,
            elapsed: 0.0,
        };
        Self::from_parts(kind, &Bindings::new().output(Role::Time, output))
    }

    /// Replays each `(stream, samples)` pair one sample per tick.
    pub fn input_feeder(
        channels: impl IntoIterator<Item = (String, Vec<f64>)>,
    ) -> Result<Self, GraphError> {
        let mut bindings = Bindings::new();
        let mut arrays = Vec::new();
        for (i, (name, samples)) in channels.into_iter().enumerate() {
            bindings = bindings.output(Role::Channel(i), name);
            arrays.push(Arc::from(samples));
        }
        let kind = LeafKind::InputFeeder {
            channels: arrays,
            index: 0,
        };
        Self::from_parts(kind, &bindings)
    }

    /// Emits a crossing flag and the held direction of a sign stream.
    ///
    /// The flag on tick `i` judges the sign seen on tick `i - 1`; tick 0
    /// emits flag `0` and direction `+1`.
    pub fn direction_tracker(
        signal: impl Into<String>,
        flag: impl Into<String>,
        direction: impl Into<String>,
        rule: CrossingRule,
    ) -> Result<Self, GraphError> {
        let bindings = Bindings::new()
            .input(Role::Signal, signal)
            .output(Role::Flag, flag)
            .output(Role::Direction, direction);
        Self::from_parts(LeafKind::DirectionTracker(DirectionTracker::new(rule)), &bindings)
    }

    fn unary(
        kind: LeafKind,
        signal: impl Into<String>,
        output: impl Into<String>,
    ) -> Result<Self, GraphError> {
        let bindings = Bindings::new()
            .input(Role::Signal, signal)
            .output(Role::Output, output);
        Self::from_parts(kind, &bindings)
    }

    /// The leaf's kind and state.
    pub fn kind(&self) -> &LeafKind {
        &self.kind
    }

    /// Input bindings in canonical order.
    pub fn inputs(&self) -> &[Binding] {
        &self.inputs
    }

    /// Output bindings in canonical order.
    pub fn outputs(&self) -> &[Binding] {
        &self.outputs
    }

    /// Feedback bindings in canonical order.
    pub fn feedback(&self) -> &[Binding] {
        &self.feedback
    }

    /// Every stream the leaf reads: inputs, then feedback.
    pub fn reads(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .chain(&self.feedback)
            .map(|b| b.stream.as_str())
    }

    /// `Kind->out1,out2`.
    pub fn label(&self) -> String {
        let outputs: Vec<&str> = self.outputs.iter().map(|b| b.stream.as_str()).collect();
        format!("{}->{}", self.kind.name(), outputs.join(","))
    }

    /// Restores construction-time numeric state.
    pub fn reset(&mut self) {
        self.kind.reset();
    }

    /// Appends one sample to each output.
    pub(crate) fn process(&mut self, store: &mut StreamStore, ports: &Ports) -> Result<(), GraphError> {
        match &mut self.kind {
            LeafKind::Derivative => {
                let value = match (store.tail(ports.inputs[0], 2), store.tail(ports.inputs[1], 2)) {
                    ([s0, s1], [t0, t1]) => (s1 - s0) / (t1 - t0),
                    _ => 0.0,
                };
                store.append(ports.outputs[0], value);
            }
            LeafKind::RunningSum(sum) => {
                let value = sum.push(store.history(ports.inputs[0]));
                store.append(ports.outputs[0], value);
            }
            LeafKind::FunctionalWindowLength { window } => {
                let value = effective_window(store.len(ports.inputs[0]), *window);
                store.append(ports.outputs[0], value);
            }
            LeafKind::Discretizor { bias } => {
                let value = discretize(latest(store, ports.inputs[0]), *bias);
                store.append(ports.outputs[0], value);
            }
            LeafKind::Exponent { exponent } => {
                let value = power(latest(store, ports.inputs[0]), *exponent);
                store.append(ports.outputs[0], value);
            }
            LeafKind::Map(func) => {
                let value = func.apply(latest(store, ports.inputs[0]));
                store.append(ports.outputs[0], value);
            }
            LeafKind::Aggregator { reduction, .. } => {
                self.scratch.clear();
                self.scratch
                    .extend(ports.inputs.iter().map(|&id| latest(store, id)));
                self.scratch
                    .extend(ports.feedback.iter().map(|&id| latest(store, id)));
                let value = reduction.reduce(&self.scratch);
                store.append(ports.outputs[0], value);
            }
            LeafKind::TimeCounter { interval, elapsed } => {
                store.append(ports.outputs[0], *elapsed);
                *elapsed += *interval;
            }
            LeafKind::InputFeeder { channels, index } => {
                if let Some(k) = channels.iter().position(|c| *index >= c.len()) {
                    return Err(GraphError::InputExhausted {
                        stream: self.outputs[k].stream.clone(),
                        index: *index,
                    });
                }
                for (channel, &id) in channels.iter().zip(&ports.outputs) {
                    store.append(id, channel[*index]);
                }
                *index += 1;
            }
            LeafKind::HighpassDcBlock(filter) => {
                let value = filter.process(latest(store, ports.inputs[0]));
                store.append(ports.outputs[0], value);
            }
            LeafKind::FixedWindow { window, func } => {
                let value = func.reduce(store.tail(ports.inputs[0], *window));
                store.append(ports.outputs[0], value);
            }
            LeafKind::DirectionTracker(tracker) => {
                let flag = match store.tail(ports.inputs[0], 2) {
                    [previous, _] => {
                        if tracker.step(*previous) {
                            1.0
                        } else {
                            0.0
                        }
                    }
                    _ => 0.0,
                };
                store.append(ports.outputs[0], flag);
                store.append(ports.outputs[1], tracker.direction());
            }
        }
        Ok(())
    }
}

/// Newest sample of a stream, `0` when it is still empty.
fn latest(store: &StreamStore, id: StreamId) -> f64 {
    store.last(id).unwrap_or(0.0)
}
