//! Terminal user interface.
//!
//! This module provides:
//! - [`UserInterface`] trait so commands can be tested against [`MockUI`]
//! - [`TerminalUI`] for real terminals
//! - [`ProgressTraceSink`] for live stage progress during a run
//!
//! # Example
//!
//! ```
//! use apiflow::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.success("Pipeline complete");
//! assert_eq!(ui.successes(), ["Pipeline complete"]);
//! ```

pub mod mock;
pub mod output;
pub mod progress;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use progress::{format_duration, ProgressTraceSink};
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, FlowTheme};

/// Trait for user interface interactions.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Change the output mode.
    fn set_output_mode(&mut self, mode: OutputMode);

    /// Display a status message (hidden in quiet mode).
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Always shown.
    fn error(&mut self, msg: &str);

    /// Write requested output (JSON, YAML) regardless of mode.
    fn data(&mut self, text: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Check if running in an interactive terminal.
    fn is_interactive(&self) -> bool;
}
