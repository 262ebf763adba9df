//! storyflow-cli library: config, logging middleware and run logic for the
//! `storyflow` binary, reusable from other crates and tests.
//!
//! ## Usage
//!
//! ```rust,no_run,ignore
//! let state = storyflow_cli::run(storyflow_cli::Request::WorldSynopsis {
//!     world_id: "…".into(),
//! })
//! .await?;
//! println!("{}", state.world_summary.unwrap_or_default());
//! ```

mod config;
mod middleware;
mod run;

pub use config::{ConfigError, Error, LlmBackend, RunConfig, RunOptions};
pub use middleware::{LoggingMiddleware, WithNodeLogging};
pub use run::{
    build_services, exit_code, load_store, outcome_lines, run, run_request, run_with_config, run_with_options,
    save_store, CannedLlm, ConfigSummary, Request, CANNED_DOCUMENT, CANNED_TEXT, EXIT_CONFIGURATION, EXIT_EXECUTION,
    EXIT_RECURSION_LIMIT,
};
pub use storyflow::StoryState;

/// Initialises `tracing-subscriber` on stderr: `RUST_LOG` wins, else `debug`
/// when verbose and `info` otherwise.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests;
