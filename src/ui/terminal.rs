//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{FlowTheme, OutputMode, UserInterface};

/// Terminal UI implementation.
///
/// Status output goes to stdout; errors go to stderr so that `--json`
/// output stays machine-readable.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: FlowTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode, no_color: bool) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme: FlowTheme::detect(no_color),
            mode,
        }
    }

    pub fn theme(&self) -> &FlowTheme {
        &self.theme
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn data(&mut self, text: &str) {
        writeln!(self.out, "{}", text).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn is_interactive(&self) -> bool {
        self.out.is_term()
    }
}

/// Create the terminal UI for the resolved output mode.
pub fn create_ui(mode: OutputMode, no_color: bool) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode, no_color))
}
