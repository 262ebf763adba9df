//! Run entry points: run with env config, run_with_options, or run_with_config.
//!
//! A [`Request`] names one operation plus its arguments; it picks the graph
//! assembly and seeds the initial state.

pub use crate::config::Error;

mod config_summary;
mod exit_code;
mod outcome;
mod request;
mod run_with_config;
mod services;
mod store_file;

use storyflow::StoryState;

use crate::config::{RunConfig, RunOptions};

pub use config_summary::ConfigSummary;
pub use exit_code::{exit_code, EXIT_CONFIGURATION, EXIT_EXECUTION, EXIT_RECURSION_LIMIT};
pub use outcome::outcome_lines;
pub use request::Request;
pub use run_with_config::{run_request, run_with_config};
pub use services::{build_services, CannedLlm, CANNED_DOCUMENT, CANNED_TEXT};
pub use store_file::{load_store, save_store};

/// Runs `request` with config from env (and `.env`), returns the final state.
pub async fn run(request: Request) -> Result<StoryState, Error> {
    dotenv::dotenv().ok();
    let config = RunConfig::from_env()?;
    config.validate()?;
    run_with_config(&config, request).await
}

/// Like [`run`], applying `options` on top of the env config.
pub async fn run_with_options(request: Request, options: &RunOptions) -> Result<StoryState, Error> {
    dotenv::dotenv().ok();
    let mut config = RunConfig::from_env()?;
    config.apply_options(options);
    config.validate()?;
    run_with_config(&config, request).await
}
