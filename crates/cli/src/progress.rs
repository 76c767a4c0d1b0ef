//! Busy indicator and error banner for the terminal

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::IsTerminal;
use std::time::Duration;

use qaflow_common::{Gates, Stage, StageObserver};

use crate::output::{print_error, print_info};

/// Shows one spinner per in-flight stage on stderr
pub struct TerminalObserver {
    spinners: Mutex<HashMap<Stage, ProgressBar>>,
    interactive: bool,
    quiet: bool,
}

impl TerminalObserver {
    /// `quiet` suppresses informational lines (used for JSON output)
    pub fn new(quiet: bool) -> Self {
        Self {
            spinners: Mutex::new(HashMap::new()),
            interactive: std::io::stderr().is_terminal(),
            quiet,
        }
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        let progress = ProgressBar::new_spinner();
        if !self.interactive {
            progress.set_draw_target(ProgressDrawTarget::hidden());
        }
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        progress.set_style(style);
        progress.set_message(message.to_string());
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}

impl StageObserver for TerminalObserver {
    fn busy(&self, stage: Stage, message: &str) {
        let progress = self.spinner(message);
        if let Some(previous) = self.spinners.lock().insert(stage, progress) {
            previous.finish_and_clear();
        }
    }

    fn idle(&self, stage: Stage) {
        if let Some(progress) = self.spinners.lock().remove(&stage) {
            progress.finish_and_clear();
        }
    }

    fn error(&self, message: &str) {
        print_error(message);
    }

    fn gates_changed(&self, gates: Gates) {
        if self.quiet {
            return;
        }
        if gates.can_report {
            print_info("Report generation is available: `qaflow report`");
        } else if gates.can_run {
            print_info("Test execution is available: `qaflow execute`");
        }
    }
}
