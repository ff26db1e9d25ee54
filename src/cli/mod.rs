//! Command-line interface.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`driver`] - Ordered work-item dispatch

pub mod args;
pub mod driver;

pub use args::Cli;
pub use driver::{Driver, RunSummary};
