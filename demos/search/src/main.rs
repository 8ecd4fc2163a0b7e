//! Search demo - affect-dispatch example
//!
//! Replays a sequence of keystrokes into a debounced search box and prints
//! what the application ended up with.
//!
//! # Usage
//!
//! ```sh
//! # Type "r", "ru", "rus", "rust" 50ms apart
//! cargo run -p search-demo
//!
//! # Custom keystrokes, slow typing, action logging
//! cargo run -p search-demo -- py pyt pyth --keystroke-ms 300 --log-actions
//!
//! # Tunables from a JSON file, e.g. {"max_chain_depth": 16}
//! cargo run -p search-demo -- --config dispatch.json
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use affect_dispatch::prelude::*;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use search_demo::{AppAction, AppState, AppUpdate, Catalog, SearchAction, SearchUpdate};

/// Debounced search - affect-dispatch example
#[derive(Parser, Debug)]
#[command(name = "search-demo")]
#[command(about = "Replays keystrokes into a debounced search component")]
struct Args {
    /// Successive contents of the search box
    #[arg(default_values = ["r", "ru", "rus", "rust"])]
    keystrokes: Vec<String>,

    /// Pause between keystrokes in milliseconds
    #[arg(long, default_value = "50")]
    keystroke_ms: u64,

    /// Quiet period before a query is looked up
    #[arg(long, default_value = "200")]
    debounce_ms: u64,

    /// Simulated lookup latency
    #[arg(long, default_value = "100")]
    latency_ms: u64,

    /// Dispatcher config as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log every dispatched action at debug level
    #[arg(long)]
    log_actions: bool,

    /// Only log actions matching these comma-separated patterns
    #[arg(long)]
    log_filter: Option<String>,
}

fn load_config(path: Option<&PathBuf>) -> Result<DispatchConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(DispatchConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let default_level = if args.log_actions { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(args.config.as_ref())?;
    let update = AppUpdate::new(SearchUpdate::new(
        Catalog::default(),
        Duration::from_millis(args.debounce_ms),
        Duration::from_millis(args.latency_ms),
    ));

    let host = SharedState::new(AppState::default());
    let watched = Dispatcher::builder(host.clone(), update)
        .config(config)
        .watcher(
            TracingWatcher::new(WatchFilter::new(args.log_filter.as_deref(), None))
                .active(args.log_actions),
        )
        .build_watched();

    watched.send(AppAction::Start).await?;

    // The search box only speaks SearchAction
    let search = watched.clone().map(AppAction::Search);
    let mut typing = Vec::new();
    for keystroke in args.keystrokes {
        typing.push(tokio::spawn(search.send(SearchAction::QueryChange(keystroke))));
        tokio::time::sleep(Duration::from_millis(args.keystroke_ms)).await;
    }
    for task in typing {
        task.await??;
    }

    let state = host.get();
    tracing::info!(
        actions = watched.log().len(),
        lookups = state.search.completed,
        "settled"
    );

    println!("query:   {:?}", state.search.query);
    println!("results: {}", state.search.results.join(", "));
    if let Some(started_at) = state.started_at {
        println!("started: {}", started_at.to_rfc3339());
    }
    println!("actions: {}", watched.action_types().join(" -> "));

    Ok(())
}
