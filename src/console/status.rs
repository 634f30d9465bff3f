use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner for one long-running step, finished with a ✔ or ✖ line.
pub struct Status {
    bar: ProgressBar,
}

impl Status {
    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    pub fn update(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    pub fn succeed(self, message: impl AsRef<str>) {
        self.bar.finish_and_clear();
        println!("{} {}", "✔".green(), message.as_ref());
    }

    pub fn fail(self, message: impl AsRef<str>) {
        self.bar.finish_and_clear();
        println!("{} {}", "✖".red(), message.as_ref());
    }

    /// Clear the spinner without printing a result line
    pub fn stop(self) {
        self.bar.finish_and_clear();
    }
}
