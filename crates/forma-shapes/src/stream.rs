//! Streaming decompositions: plans compiled into node graphs.
//!
//! Each pass is a nested composite holding the transform's graph and a
//! `Difference` aggregator that produces the next residual. A final summer
//! adds every pass's piece into the output stream.

use forma_core::{Composite, Graph, Leaf, Node, Reduction, StreamStore};

use crate::decompose::Decomposition;
use crate::error::{Result, ShapeError};
use crate::transform::Plan;

/// Stream the driver feeds the input signal into.
pub const INPUT_STREAM: &str = "input";
/// Stream the clock writes.
pub const TIME_STREAM: &str = "time";
/// Stream holding the accumulated decomposition.
pub const OUTPUT_STREAM: &str = "output";

/// Name of the residual left after `pass` (1-based) of a decomposition into `output`.
pub fn residual_stream(output: &str, pass: usize) -> String {
    format!("_{output}_residual_{pass}")
}

fn piece_stream(output: &str, pass: usize) -> String {
    format!("_{output}_piece_{pass}")
}

/// Builds the graph for `plan` reading `input` (and `time`) and writing `output`.
pub fn plan_graph(
    plan: &Plan,
    input: &str,
    output: &str,
    window: usize,
    time: &str,
) -> Result<Composite> {
    let transforms = plan.transforms();
    if transforms.is_empty() {
        return Err(ShapeError::EmptyPlan);
    }

    let mut children: Vec<Node> = Vec::with_capacity(transforms.len() + 1);
    let mut pieces = Vec::with_capacity(transforms.len());
    let mut residual = input.to_string();
    for (index, transform) in transforms.iter().enumerate() {
        let pass = index + 1;
        let piece = piece_stream(output, pass);
        let next = residual_stream(output, pass);
        let stage = Composite::new(
            format!("pass{pass}"),
            vec![
                transform.graph(&residual, &piece, window, time)?.into(),
                Leaf::aggregator(&[residual.as_str(), piece.as_str()], next.as_str(), Reduction::Difference)?
                    .into(),
            ],
        )?;
        children.push(stage.into());
        pieces.push(piece);
        residual = next;
    }

    let operands: Vec<&str> = pieces.iter().map(String::as_str).collect();
    children.push(Leaf::summer(&operands, output, 0.0)?.into());
    Ok(Composite::new(plan.label(), children)?)
}

/// A self-driving graph: clock, input feeder, and the plan's decomposition.
pub fn decomposition_graph(
    plan: &Plan,
    signal: &[f64],
    sample_rate: f64,
    window: usize,
) -> Result<Graph> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(ShapeError::InvalidSampleRate(sample_rate));
    }
    if window == 0 {
        return Err(ShapeError::InvalidWindow);
    }
    let root = Composite::new(
        "root",
        vec![
            Leaf::time_counter(TIME_STREAM, sample_rate)?.into(),
            Leaf::input_feeder([(INPUT_STREAM.to_string(), signal.to_vec())])?.into(),
            plan_graph(plan, INPUT_STREAM, OUTPUT_STREAM, window, TIME_STREAM)?.into(),
        ],
    )?;
    Ok(Graph::new(root)?)
}

/// Runs `plan` over `signal` sample by sample.
pub fn run_streaming(
    plan: &Plan,
    signal: &[f64],
    sample_rate: f64,
    window: usize,
) -> Result<Decomposition> {
    run_streaming_with(plan, signal, sample_rate, window, |_| {})
}

/// [`run_streaming`] calling `progress(ticks_done)` after every tick.
pub fn run_streaming_with(
    plan: &Plan,
    signal: &[f64],
    sample_rate: f64,
    window: usize,
    mut progress: impl FnMut(usize),
) -> Result<Decomposition> {
    let mut graph = decomposition_graph(plan, signal, sample_rate, window)?;
    tracing::debug!(
        "streaming {}: {} leaves over {} samples",
        plan.label(),
        graph.len(),
        signal.len()
    );
    let mut store = StreamStore::new();
    for tick in 0..signal.len() {
        graph.tick(&mut store)?;
        progress(tick + 1);
    }

    let passes = plan.passes();
    if signal.is_empty() {
        return Ok(Decomposition {
            output: Vec::new(),
            residual: Vec::new(),
            passes,
        });
    }
    Ok(Decomposition {
        output: store.samples(OUTPUT_STREAM)?.to_vec(),
        residual: store
            .samples(&residual_stream(OUTPUT_STREAM, passes))?
            .to_vec(),
        passes,
    })
}
