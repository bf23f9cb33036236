//! Command-line interface for apiflow.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ConfigArgs, RunArgs, StagesArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
