//! Console Module
//!
//! Operator-facing I/O: numbered menus, a spinner with success/failure
//! markers, and the instructions screen. Diagnostic logging goes through
//! `tracing` instead and never through here.

mod instructions;
mod prompt;
mod status;

pub use instructions::show_instructions;
pub use prompt::{Prompter, StdinPrompter};
pub use status::Status;

#[cfg(test)]
pub(crate) use prompt::ScriptedPrompter;

use colored::Colorize;

/// Red label followed by plain detail text, matching `Status::fail`
pub fn failure_line(label: &str, detail: impl std::fmt::Display) -> String {
    format!("{} {}", label.red(), detail)
}

/// Highlight a value the operator needs to notice (costs, addresses)
pub fn highlight(value: impl std::fmt::Display) -> String {
    value.to_string().blue().to_string()
}
