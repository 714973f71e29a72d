//! Terminal presentation of status lines and errors.

use crate::errors::StewError;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

/// Whether stdout is a terminal and colors should be used
pub fn stdout_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn stderr_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Emphasize a name or path in a status line
pub fn highlight(text: &str) -> String {
    if stdout_color() {
        text.green().to_string()
    } else {
        text.to_string()
    }
}

/// Format an error for the terminal: expected stops as warnings, everything else as errors
pub fn format_error(err: &anyhow::Error, color: bool) -> String {
    let clean_abort = err
        .downcast_ref::<StewError>()
        .is_some_and(StewError::is_clean_abort);
    let message = format!("{err:#}");

    match (clean_abort, color) {
        (true, true) => format!("{} {message}", "Warning:".yellow().bold()),
        (true, false) => format!("Warning: {message}"),
        (false, true) => format!("{} {message}", "Error:".red().bold()),
        (false, false) => format!("Error: {message}"),
    }
}

/// Print an error to stderr
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{}", format_error(err, stderr_color()));
}

/// Print a non-fatal condition to stderr and carry on
pub fn print_warning(err: &StewError) {
    if stderr_color() {
        eprintln!("{} {err}", "Warning:".yellow().bold());
    } else {
        eprintln!("Warning: {err}");
    }
}

/// Spinner on stderr for network waits; hidden when stderr is not a terminal
pub fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .context("Invalid spinner template")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
