//! Waiting indicator shown until the first answer chunk arrives

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner on stderr while a turn is in flight.
///
/// Hidden when quiet; indicatif also hides it when stderr is not a terminal.
pub struct TurnSpinner {
    bar: ProgressBar,
}

impl TurnSpinner {
    pub fn new(provider: &str, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(format!("Asking {}...", provider.bold()));
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Remove the spinner line. Safe to call more than once.
    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl Drop for TurnSpinner {
    fn drop(&mut self) {
        self.finish();
    }
}
