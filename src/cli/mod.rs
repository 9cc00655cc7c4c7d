//! Command-line interface
//!
//! Drives the resource loader from the terminal: `fetch` exercises the
//! engine against any JSON URL, `posts` renders the post list widget.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

/// Print a top-level error in the requested format and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        println!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1);
}
