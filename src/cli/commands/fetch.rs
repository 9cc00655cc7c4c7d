//! `fetch` command: load any JSON resource through the loader.

use anyhow::Result;
use clap::Args;
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;

use crate::adapters::http::HttpResourceFetcher;
use crate::cli::output::progress::{create_spinner_with_message, hidden_spinner, ProgressBarExt};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, RequestState};
use crate::services::ResourceLoader;

/// Lines of pretty-printed JSON shown in human mode.
const PREVIEW_LINES: usize = 40;

/// Arguments for `fetch`.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// URL of the resource to fetch
    pub url: String,

    /// Force a second, cache-bypassing fetch after the first one settles
    #[arg(long)]
    pub retry: bool,

    /// Number of views subscribing to the URL at the same time
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u16).range(1..))]
    pub subscribers: u16,
}

/// Result of `fetch`.
#[derive(Debug, Serialize)]
pub struct FetchOutput {
    /// Requested URL
    pub url: String,
    /// Final request state name
    pub status: &'static str,
    /// Number of concurrent views
    pub subscribers: u16,
    /// Subscribers that observed the same outcome as the first one.
    pub agreeing_subscribers: usize,
    /// Whether a forced refetch followed the first load
    pub retried: bool,
    /// Whether the URL is cached afterwards
    pub cached: bool,
    /// Decoded body on success
    pub data: Option<Value>,
    /// Failure message
    pub error: Option<String>,
    /// Failure category
    pub error_kind: Option<&'static str>,
}

impl FetchOutput {
    fn new(args: &FetchArgs, state: &RequestState<Value>, agreeing: usize, cached: bool) -> Self {
        Self {
            url: args.url.clone(),
            status: state.as_str(),
            subscribers: args.subscribers,
            agreeing_subscribers: agreeing,
            retried: args.retry,
            cached,
            data: state.data().map(|value| (**value).clone()),
            error: state.error().map(ToString::to_string),
            error_kind: state.error().map(|err| err.kind()),
        }
    }
}

impl CommandOutput for FetchOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("URL: {}", self.url),
            format!("Status: {}", self.status),
            format!(
                "Subscribers: {} ({} saw the same result)",
                self.subscribers, self.agreeing_subscribers
            ),
            format!("Cached: {}", if self.cached { "yes" } else { "no" }),
        ];
        if self.retried {
            lines.push("Retried: yes".to_string());
        }

        if let Some(ref error) = self.error {
            lines.push(format!("Error: {error}"));
        }

        if let Some(ref data) = self.data {
            lines.push(String::new());
            lines.push(preview(data));
        }

        lines.join("\n")
    }

    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn preview(data: &Value) -> String {
    let pretty = serde_json::to_string_pretty(data).unwrap_or_default();
    let total = pretty.lines().count();
    if total <= PREVIEW_LINES {
        return pretty;
    }

    let mut shown: Vec<&str> = pretty.lines().take(PREVIEW_LINES).collect();
    let more = format!("… ({} more lines)", total - PREVIEW_LINES);
    shown.push(&more);
    shown.join("\n")
}

/// Run `fetch`.
pub async fn execute(args: FetchArgs, config: &Config, json: bool) -> Result<()> {
    let fetcher = HttpResourceFetcher::<Value>::with_config(&config.http)?;
    let loader = ResourceLoader::new(fetcher);

    let spinner = if json {
        hidden_spinner()
    } else {
        create_spinner_with_message(format!("Fetching {}", args.url))
    };

    let mut views: Vec<_> = (0..args.subscribers)
        .map(|_| loader.subscribe(args.url.as_str()))
        .collect();

    let outcomes = join_all(views.iter_mut().map(|view| view.settled())).await;

    let mut state = outcomes.first().cloned().unwrap_or_default();
    let agreeing = outcomes.iter().filter(|outcome| **outcome == state).count();

    if args.retry {
        if let Some(primary) = views.first_mut() {
            spinner.set_message(format!("Retrying {}", args.url));
            primary.retry();
            state = primary.settled().await;
        }
    }

    match state.error() {
        Some(err) => spinner.finish_error(err.to_string()),
        None => spinner.finish_success(format!("{} settled", args.url)),
    }

    let cached = loader.store().cached(&args.url).is_some();
    output(&FetchOutput::new(&args, &state, agreeing, cached), json);
    Ok(())
}
