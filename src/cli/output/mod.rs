//! CLI output formatting module
//!
//! Human/JSON rendering of command results, tables, and spinners.

pub mod progress;
pub mod table;

pub use table::TableFormatter;

use serde::Serialize;

/// Trait for command results that render as text or JSON.
pub trait CommandOutput: Serialize {
    /// Human-readable rendering.
    fn to_human(&self) -> String;
    /// Machine-readable rendering used with `--json`.
    fn to_json(&self) -> serde_json::Value;
}

/// Print `result` in the mode selected on the command line.
pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate a string to a maximum number of characters, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
