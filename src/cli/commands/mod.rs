//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`]. Running `apiflow` without a subcommand runs the
//! pipeline with default arguments.

pub mod config;
pub mod dispatcher;
pub mod run;
pub mod stages;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
