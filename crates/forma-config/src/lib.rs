//! Job configuration for forma.
//!
//! A job names the window, sample rate, evaluation mode and the list of
//! decomposition plans to run over one input signal. Jobs are stored as TOML
//! and convert into the [`forma_shapes`] types that do the work.
//!
//! # Example
//!
//! ```rust
//! use forma_config::{JobConfig, PlanConfig, TransformConfig};
//!
//! let job = JobConfig::new("demo")
//!     .with_window(2048)
//!     .with_plan(PlanConfig::iterative(TransformConfig::square(), 3));
//! job.validate().unwrap();
//!
//! let text = job.to_toml().unwrap();
//! assert_eq!(JobConfig::from_toml(&text).unwrap(), job);
//! ```

mod error;
mod job;

pub use error::ConfigError;
pub use job::{JobConfig, ModeConfig, PlanConfig, RuleConfig, TransformConfig};
