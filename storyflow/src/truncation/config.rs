//! Truncation settings read from the environment.

use super::error::TruncationError;
use super::limits::{compute_limits, Limits};

pub const ENV_PRICE_INPUT: &str = "LLM_PRICE_INPUT_PER_TOKEN";
pub const ENV_PRICE_OUTPUT: &str = "LLM_PRICE_OUTPUT_PER_TOKEN";
pub const ENV_BUDGET: &str = "LLM_BUDGET_USD";
pub const ENV_RESERVED_OUTPUT: &str = "LLM_RESERVED_OUTPUT_TOKENS";
pub const ENV_MODEL_CONTEXT: &str = "LLM_MODEL_CONTEXT_TOKENS";
pub const ENV_SAFETY_MARGIN: &str = "LLM_SAFETY_MARGIN_TOKENS";
pub const ENV_MIN_PER_SECTION: &str = "LLM_MIN_TOKENS_PER_SECTION";

/// Prices, budget and token counts for one model call.
///
/// Defaults: $5/M input tokens, $20/M output tokens, $0.20 per call, 3000
/// tokens reserved for output, 128k context, 500 token safety margin and a
/// 100 token floor per section.
#[derive(Debug, Clone, PartialEq)]
pub struct TruncationConfig {
    pub price_input_per_token: f64,
    pub price_output_per_token: f64,
    pub budget_usd: f64,
    pub reserved_output_tokens: usize,
    pub model_context_tokens: usize,
    pub safety_margin_tokens: usize,
    pub min_tokens_per_section: usize,
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self {
            price_input_per_token: 5.0 / 1_000_000.0,
            price_output_per_token: 20.0 / 1_000_000.0,
            budget_usd: 0.20,
            reserved_output_tokens: 3000,
            model_context_tokens: 128_000,
            safety_margin_tokens: 500,
            min_tokens_per_section: 100,
        }
    }
}

impl TruncationConfig {
    /// Reads `LLM_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset or unparseable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let parse_f64 = |key: &str, default: f64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .unwrap_or(default)
        };
        let parse_usize = |key: &str, default: usize| {
            lookup(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(default)
        };
        Self {
            price_input_per_token: parse_f64(ENV_PRICE_INPUT, d.price_input_per_token),
            price_output_per_token: parse_f64(ENV_PRICE_OUTPUT, d.price_output_per_token),
            budget_usd: parse_f64(ENV_BUDGET, d.budget_usd),
            reserved_output_tokens: parse_usize(ENV_RESERVED_OUTPUT, d.reserved_output_tokens),
            model_context_tokens: parse_usize(ENV_MODEL_CONTEXT, d.model_context_tokens),
            safety_margin_tokens: parse_usize(ENV_SAFETY_MARGIN, d.safety_margin_tokens),
            min_tokens_per_section: parse_usize(ENV_MIN_PER_SECTION, d.min_tokens_per_section),
        }
    }

    /// Ceilings derived with `compute_limits`.
    pub fn limits(&self) -> Result<Limits, TruncationError> {
        compute_limits(
            self.price_input_per_token,
            self.price_output_per_token,
            self.budget_usd,
            self.reserved_output_tokens,
            self.model_context_tokens,
            self.safety_margin_tokens,
        )
    }
}
