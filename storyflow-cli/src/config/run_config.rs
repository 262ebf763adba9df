//! Run config: model backend, recursion limit, language, truncation settings.
//! Filled from env / .env; CLI flags override through [`RunOptions`](super::RunOptions).

use std::path::PathBuf;
use std::str::FromStr;

use storyflow::{Language, TruncationConfig};
use thiserror::Error;

/// Error type used by config loading and the run glue.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_RECURSION_LIMIT: usize = 50;

/// Invalid or missing configuration. Always maps to exit code 2.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set; please configure it in .env")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Which `LlmClient` to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LlmBackend {
    /// `ChatOpenAI` against `api_base`.
    OpenAi,
    /// Offline `MockLlm` with a canned document response.
    Mock,
}

impl FromStr for LlmBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "mock" => Ok(Self::Mock),
            other => Err(ConfigError::Invalid {
                name: "LLM_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

/// Everything a run needs besides the operation arguments.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// OpenAI API base URL, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    /// OpenAI API key; required only for the `openai` backend.
    pub api_key: Option<String>,
    /// Model name, e.g. `gpt-4o-mini`.
    pub model: String,
    /// Sampling temperature 0–2. Default: unset (use API default).
    pub temperature: Option<f32>,
    pub backend: LlmBackend,
    /// Maximum node invocations per run.
    pub recursion_limit: usize,
    pub language: Language,
    pub truncation: TruncationConfig,
    /// JSON snapshot of the document store, loaded before and written after each run.
    pub store_path: Option<PathBuf>,
    /// Print node updates as they happen.
    pub stream: bool,
    /// Debug logs and a config summary on stderr.
    pub verbose: bool,
}

impl RunConfig {
    /// Fill config from env vars. Call `dotenv::dotenv().ok()` first to pick up `.env`.
    ///
    /// Only parses: cross-field checks run in [`validate`](Self::validate),
    /// after CLI overrides are applied. `OPENAI_API_KEY` is then required when
    /// the backend is `openai` (the default). `OPENAI_API_BASE`, `OPENAI_MODEL`, `OPENAI_TEMPERATURE`, `RECURSION_LIMIT`,
    /// `LANGUAGE`, `STORE_PATH` and the `LLM_*` truncation settings are optional.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok())?)
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// Fails only on values that do not parse (backend, limit, language).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup("LLM_BACKEND") {
            Some(v) => v.parse()?,
            None => LlmBackend::OpenAi,
        };
        let api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        let recursion_limit = match lookup("RECURSION_LIMIT") {
            Some(v) => parse_limit(&v)?,
            None => DEFAULT_RECURSION_LIMIT,
        };
        let language = match lookup("LANGUAGE") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "LANGUAGE",
                value: v.clone(),
            })?,
            None => Language::default(),
        };
        Ok(Self {
            api_base: lookup("OPENAI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_key,
            model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: lookup("OPENAI_TEMPERATURE").and_then(|s| s.parse().ok()),
            backend,
            recursion_limit,
            language,
            truncation: TruncationConfig::from_lookup(&lookup),
            store_path: lookup("STORE_PATH").map(PathBuf::from),
            stream: false,
            verbose: false,
        })
    }

    /// Checks cross-field requirements (API key for the openai backend, non-zero limit).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == LlmBackend::OpenAi && self.api_key.is_none() {
            return Err(ConfigError::Missing("OPENAI_API_KEY"));
        }
        if self.recursion_limit == 0 {
            return Err(ConfigError::Invalid {
                name: "RECURSION_LIMIT",
                value: "0".into(),
            });
        }
        Ok(())
    }

    /// Apply optional overrides from `RunOptions`; only set fields override.
    pub fn apply_options(&mut self, options: &super::RunOptions) {
        if let Some(backend) = options.backend {
            self.backend = backend;
        }
        if let Some(model) = &options.model {
            self.model = model.clone();
        }
        if let Some(t) = options.temperature {
            self.temperature = Some(t);
        }
        if let Some(limit) = options.recursion_limit {
            self.recursion_limit = limit;
        }
        if let Some(language) = options.language {
            self.language = language;
        }
        if let Some(budget) = options.budget_usd {
            self.truncation.budget_usd = budget;
        }
        if options.store_path.is_some() {
            self.store_path = options.store_path.clone();
        }
        if options.stream {
            self.stream = true;
        }
        self.verbose = options.verbose;
    }
}

fn parse_limit(value: &str) -> Result<usize, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name: "RECURSION_LIMIT",
        value: value.to_string(),
    })
}
