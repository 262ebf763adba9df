//! Token-budget truncation for model prompts.
//!
//! Derives token ceilings from pricing (`compute_limits`), measures text with a
//! `Tokenizer`, and cuts `## `-sectioned prompts to fit (`PromptTruncator`).
//! Pure and reentrant: no I/O, no shared mutable state.

mod config;
mod error;
mod limits;
mod sections;
mod tokenizer;
mod truncator;

pub use config::{
    TruncationConfig, ENV_BUDGET, ENV_MIN_PER_SECTION, ENV_MODEL_CONTEXT, ENV_PRICE_INPUT,
    ENV_PRICE_OUTPUT, ENV_RESERVED_OUTPUT, ENV_SAFETY_MARGIN,
};
pub use error::TruncationError;
pub use limits::{compute_limits, estimate_cost_usd, Limits, LimitsSummary};
pub use sections::{join_sections, parse_sections, Section};
#[cfg(feature = "tiktoken")]
pub use tokenizer::TiktokenTokenizer;
pub use tokenizer::{CharTokenizer, Tokenizer};
pub use truncator::{truncate, truncate_flat, PromptTruncator, DEFAULT_HEADER_MARKER};
