//! Live stage progress.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::flow::{StageStatus, TraceEvent, TraceSink};

use super::FlowTheme;

/// Trace sink that draws a spinner for the running stage.
///
/// Each stage gets a spinner on `StageStarting` which is replaced by a
/// status line on `StageFinished`. The spinner is drawn to stderr and is
/// hidden automatically when stderr is not a terminal.
pub struct ProgressTraceSink {
    theme: FlowTheme,
    current: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl ProgressTraceSink {
    pub fn new(theme: FlowTheme) -> Self {
        Self {
            theme,
            current: Mutex::new(None),
            hidden: false,
        }
    }

    /// A sink that tracks events without drawing anything.
    pub fn hidden() -> Self {
        Self {
            theme: FlowTheme::plain(),
            current: Mutex::new(None),
            hidden: true,
        }
    }

    fn spinner(&self, message: String) -> ProgressBar {
        if self.hidden {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.magenta} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    fn finish(&self, line: String) {
        let bar = match self.current.lock() {
            Ok(mut current) => current.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let bar = bar.unwrap_or_else(|| self.spinner(String::new()));
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            bar.set_style(style);
        }
        bar.finish_with_message(line);
    }

    fn status_line(&self, status: StageStatus, text: &str) -> String {
        let style = self.theme.status_style(status);
        format!("{} {}", style.apply_to(status.display_char()), text)
    }
}

impl TraceSink for ProgressTraceSink {
    fn emit(&self, event: &TraceEvent) {
        match event {
            TraceEvent::StageStarting {
                stage,
                index,
                total,
                variant,
            } => {
                let label = match variant {
                    Some(variant) => format!("[{}/{}] {} ({})", index + 1, total, stage, variant),
                    None => format!("[{}/{}] {}", index + 1, total, stage),
                };
                let bar = self.spinner(label);
                match self.current.lock() {
                    Ok(mut current) => *current = Some(bar),
                    Err(poisoned) => *poisoned.into_inner() = Some(bar),
                }
            }
            TraceEvent::StageFinished { result } => {
                let duration = Duration::from_secs_f64(result.duration_seconds);
                let text = match &result.error {
                    Some(error) => format!("{} - {}", result.stage_name, error),
                    None => format!(
                        "{} {}",
                        result.stage_name,
                        self.theme
                            .duration
                            .apply_to(format!("({})", format_duration(duration)))
                    ),
                };
                self.finish(self.status_line(result.status, &text));
            }
            TraceEvent::StageSkipped { stage, reason } => {
                let text = format!("{} {}", stage, self.theme.dim.apply_to(format!("({})", reason)));
                self.finish(self.status_line(StageStatus::Skipped, &text));
            }
            TraceEvent::RunStarted { .. }
            | TraceEvent::RunHalted { .. }
            | TraceEvent::RunFinished { .. } => {}
        }
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}
