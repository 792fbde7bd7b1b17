//! Forma Shapes - causal square and triangle wave approximation
//!
//! Each shape exists in two forms that agree sample for sample:
//!
//! - **Batch** - whole-array procedures ([`square_wave`], [`triangle_wave`])
//! - **Streaming** - node graphs for [`forma_core::Graph`] ([`square_graph`], [`triangle_graph`])
//!
//! Both forms call the same scalar kernels in the same order, which is what
//! makes them interchangeable.
//!
//! # Decomposition
//!
//! A [`Plan`] fits shapes to a signal one pass at a time, each pass working
//! on what the previous passes left over:
//!
//! - [`iterative_apply`] - the same transform, `n` times
//! - [`combo_apply`] - a heterogeneous list of transforms, in order
//! - [`plan_graph`] - the streaming form of either
//!
//! [`render`] evaluates several plans over one signal in batch or
//! streaming [`Mode`] and returns them with a time axis.
//!
//! # Example
//!
//! ```rust
//! use forma_shapes::{Plan, RenderOptions, Transform, render, three_tone};
//!
//! let signal = three_tone(0.05, 8000.0);
//! let options = RenderOptions { sample_rate: 8000.0, window: 200, ..RenderOptions::default() };
//! let plans = [Plan::Iterative { transform: Transform::SQUARE, passes: 2 }];
//! let rendering = render(&signal, &plans, &options).unwrap();
//! assert_eq!(rendering.signals[0].output.len(), signal.len());
//! ```

pub mod decompose;
pub mod error;
pub mod memo;
pub mod render;
pub mod rms;
pub mod shaper;
pub mod signal;
pub mod square;
pub mod stream;
pub mod transform;
pub mod triangle;

pub use decompose::{Decomposition, combo_apply, iterative_apply};
pub use error::{Result, ShapeError};
pub use memo::{WindowMemo, content_key};
pub use render::{Mode, RenderOptions, Rendering, render};
pub use rms::{mean_graph, rms_graph, sliding_mean, sliding_rms};
pub use shaper::Shaper;
pub use signal::{three_tone, time_axis, tones};
pub use square::{square_graph, square_wave, square_wave_biased};
pub use stream::{
    INPUT_STREAM, OUTPUT_STREAM, TIME_STREAM, decomposition_graph, plan_graph, residual_stream,
    run_streaming, run_streaming_with,
};
pub use transform::{Plan, Transform};
pub use triangle::{rescale_gain, triangle_graph, triangle_wave, triangle_wave_with};
