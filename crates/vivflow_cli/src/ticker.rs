//! Spinner shown on stderr while the tool runs.
//!
//! The ticker only renders; it never affects control flow. It is stopped when
//! finished explicitly or when dropped, so the final glyph always comes after
//! the last spinner frame.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(80);

/// A scoped spinner with a status message.
pub struct StatusTicker {
    bar: ProgressBar,
    message: String,
    show_glyph: bool,
    finished: bool,
}

impl StatusTicker {
    /// Starts a spinner. With `visible == false`, or when stderr is not a
    /// terminal, nothing is animated.
    pub fn start(message: impl Into<String>, visible: bool) -> Self {
        let message = message.into();
        let bar = if visible && std::io::stderr().is_terminal() {
            let style = ProgressStyle::with_template("  {spinner}  {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ");
            let bar = ProgressBar::new_spinner();
            bar.set_style(style);
            bar.set_message(message.clone());
            bar.enable_steady_tick(TICK);
            bar
        } else {
            ProgressBar::hidden()
        };
        Self {
            bar,
            message,
            show_glyph: visible,
            finished: false,
        }
    }

    /// Shows the stage currently running next to the message.
    pub fn set_stage(&self, stage: impl std::fmt::Display) {
        self.bar.set_message(format!("{} ({stage})", self.message));
    }

    /// Prints a line above the spinner.
    pub fn println(&self, line: &str) {
        if self.bar.is_hidden() {
            eprintln!("{line}");
        } else {
            self.bar.println(line);
        }
    }

    /// Stops the spinner and prints the success or failure glyph.
    pub fn finish(mut self, success: bool) {
        self.stop(success);
    }

    fn stop(&mut self, success: bool) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.bar.finish_and_clear();
        if self.show_glyph {
            let glyph = if success { '✓' } else { '✗' };
            eprintln!("  {glyph}  {}", self.message);
        }
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        self.stop(false);
    }
}
