//! Optional overrides for a run (CLI flags or programmatic).
//!
//! Used by [`RunConfig::apply_options`](super::RunConfig::apply_options).

use std::path::PathBuf;

use storyflow::Language;

use super::LlmBackend;

/// Optional overrides; all fields are optional and only set fields override
/// the env-based config.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub backend: Option<LlmBackend>,
    pub model: Option<String>,
    /// Override sampling temperature (0–2).
    pub temperature: Option<f32>,
    pub recursion_limit: Option<usize>,
    pub language: Option<Language>,
    /// Override the per-call budget used for prompt truncation.
    pub budget_usd: Option<f64>,
    pub store_path: Option<PathBuf>,
    pub stream: bool,
    pub verbose: bool,
}
