//! Configuration for running story workflows.
//!
//! Re-exports [`RunConfig`], [`RunOptions`], [`LlmBackend`], [`ConfigError`] and the boxed [`Error`].

mod run_config;
mod run_options;

pub use run_config::{ConfigError, Error, LlmBackend, RunConfig};
pub use run_options::RunOptions;
