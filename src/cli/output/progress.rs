//! Spinner utilities using indicatif for terminal output
//!
//! Spinners draw to stderr, so they never mix with command output.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate operations
///
/// # Example
/// ```
/// use resource_loader::cli::output::progress::create_spinner;
///
/// let spinner = create_spinner();
/// spinner.set_message("Loading...");
/// spinner.finish_with_message("Done");
/// ```
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Create a spinner with a custom message
pub fn create_spinner_with_message(message: impl Into<String>) -> ProgressBar {
    let spinner = create_spinner();
    spinner.set_message(message.into());
    spinner
}

/// A spinner that draws nothing, for JSON mode.
pub fn hidden_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_draw_target(ProgressDrawTarget::hidden());
    spinner
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✗ {}", message.into()));
    }
}
