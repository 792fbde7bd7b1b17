//! CLI command implementations.

pub mod common;
pub mod generate;
pub mod order;
pub mod process;
