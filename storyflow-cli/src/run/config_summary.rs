//! Config summary printed to stderr when `verbose` is set.

use serde::Serialize;
use storyflow::truncation::LimitsSummary;
use storyflow::PromptTruncator;

use crate::config::{LlmBackend, RunConfig};

/// Model, run and prompt-budget settings in effect for one run.
#[derive(Debug, Serialize)]
pub struct ConfigSummary {
    pub operation: String,
    pub backend: String,
    pub model: String,
    pub api_base: String,
    pub temperature: Option<f32>,
    pub recursion_limit: usize,
    pub language: String,
    pub store_path: Option<String>,
    pub limits: LimitsSummary,
}

impl ConfigSummary {
    pub fn new(operation: &str, config: &RunConfig, truncator: &PromptTruncator) -> Self {
        let backend = match config.backend {
            LlmBackend::OpenAi => "openai",
            LlmBackend::Mock => "mock",
        };
        Self {
            operation: operation.to_string(),
            backend: backend.to_string(),
            model: config.model.clone(),
            api_base: config.api_base.clone(),
            temperature: config.temperature,
            recursion_limit: config.recursion_limit,
            language: config.language.name().to_string(),
            store_path: config.store_path.as_ref().map(|p| p.display().to_string()),
            limits: truncator.summary(),
        }
    }

    /// One `key=value` line per section, stable for grepping.
    pub fn lines(&self) -> Vec<String> {
        let l = &self.limits;
        vec![
            format!(
                "run: operation={} recursion_limit={} language={}",
                self.operation, self.recursion_limit, self.language
            ),
            format!(
                "llm: backend={} model={} api_base={} temperature={}",
                self.backend,
                self.model,
                self.api_base,
                self.temperature
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "default".to_string())
            ),
            format!(
                "budget: usd={} max_input_tokens={} max_total_tokens={} reserved_output_tokens={} min_tokens_per_section={} tokenizer={}",
                l.budget_usd,
                l.max_input_tokens,
                l.max_total_tokens,
                l.reserved_output_tokens,
                l.min_tokens_per_section,
                l.tokenizer
            ),
            format!(
                "store: path={}",
                self.store_path.as_deref().unwrap_or("(memory only)")
            ),
        ]
    }

    pub fn print_to_stderr(&self) {
        for line in self.lines() {
            eprintln!("{}", line);
        }
    }
}
