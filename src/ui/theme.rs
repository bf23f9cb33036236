//! Visual theme and styling.

use console::Style;

use crate::flow::StageStatus;

/// Terminal styles used across commands.
#[derive(Debug, Clone)]
pub struct FlowTheme {
    /// Completed stages and success messages (green).
    pub success: Style,
    /// Warnings and halted runs (orange).
    pub warning: Style,
    /// Failed stages and errors (red bold).
    pub error: Style,
    /// Running elements (magenta).
    pub info: Style,
    /// Secondary text and skipped stages.
    pub dim: Style,
    /// Banner text (magenta bold).
    pub header: Style,
    /// Durations (dim).
    pub duration: Style,
}

impl Default for FlowTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().magenta(),
            dim: Style::new().dim(),
            header: Style::new().bold().magenta(),
            duration: Style::new().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            duration: Style::new(),
        }
    }

    /// Pick the colored or plain theme for the current terminal.
    pub fn detect(no_color: bool) -> Self {
        if !no_color && should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(format!("◆ {}", title)))
    }

    /// Style for a stage status icon.
    pub fn status_style(&self, status: StageStatus) -> &Style {
        match status {
            StageStatus::Completed => &self.success,
            StageStatus::Failed => &self.error,
            StageStatus::Running => &self.info,
            StageStatus::Pending | StageStatus::Skipped => &self.dim,
        }
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_formats_messages() {
        let theme = FlowTheme::plain();
        assert_eq!(theme.format_success("Complete"), "✓ Complete");
        assert_eq!(theme.format_warning("Caution"), "⚠ Caution");
        assert_eq!(theme.format_error("Failed"), "✗ Failed");
        assert_eq!(theme.format_header("apiflow"), "◆ apiflow");
    }

    #[test]
    fn no_color_flag_forces_plain() {
        let theme = FlowTheme::detect(true);
        assert_eq!(theme.format_success("ok"), "✓ ok");
    }

    #[test]
    fn status_styles_exist_for_all_states() {
        let theme = FlowTheme::new();
        for status in [
            StageStatus::Pending,
            StageStatus::Running,
            StageStatus::Completed,
            StageStatus::Failed,
            StageStatus::Skipped,
        ] {
            let _ = theme.status_style(status).apply_to(status.display_char());
        }
    }
}
