//! Budget-aware prompt truncation.
//!
//! `PromptTruncator::truncate` fits a prompt into `max_input_tokens`:
//!
//! 1. Text at or under the ceiling is returned unchanged.
//! 2. Structured text is split into `## ` sections; the overflow is taken from
//!    the tail of each section body in order, never below
//!    `min_tokens_per_section` tokens of body.
//! 3. If the floors cannot absorb the overflow (or the rebuilt text still
//!    measures over the ceiling) the whole text is tail-cut to the ceiling.
//!
//! Output always measures at most `max_input_tokens`, and truncating twice
//! gives the same text as truncating once.

use std::sync::Arc;

use super::config::TruncationConfig;
use super::error::TruncationError;
use super::limits::{estimate_cost_usd, Limits, LimitsSummary};
use super::sections::{join_sections, parse_sections, Section};
use super::tokenizer::{decode_prefix, Tokenizer};

/// Default header marker.
pub const DEFAULT_HEADER_MARKER: &str = "## ";

/// Tokenizer plus ceilings; shared by every generation node.
#[derive(Clone)]
pub struct PromptTruncator {
    tokenizer: Arc<dyn Tokenizer>,
    header_marker: String,
    config: TruncationConfig,
    limits: Limits,
}

impl std::fmt::Debug for PromptTruncator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptTruncator")
            .field("tokenizer", &self.tokenizer.name())
            .field("header_marker", &self.header_marker)
            .field("limits", &self.limits)
            .field("min_tokens_per_section", &self.config.min_tokens_per_section)
            .finish()
    }
}

impl PromptTruncator {
    /// Builds a truncator; ceilings are computed from `config`.
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        config: TruncationConfig,
    ) -> Result<Self, TruncationError> {
        let limits = config.limits()?;
        Ok(Self {
            tokenizer,
            header_marker: DEFAULT_HEADER_MARKER.to_string(),
            config,
            limits,
        })
    }

    /// Replaces the header marker (default `"## "`).
    pub fn with_header_marker(mut self, marker: impl Into<String>) -> Self {
        self.header_marker = marker.into();
        self
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn config(&self) -> &TruncationConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    /// Truncates `text` to the configured input ceiling and section floor.
    pub fn truncate(&self, text: &str) -> String {
        truncate(
            self.tokenizer.as_ref(),
            &self.header_marker,
            text,
            self.limits.max_input_tokens,
            self.config.min_tokens_per_section,
        )
    }

    /// Estimated USD cost of a call with these prices.
    pub fn estimate_cost_usd(&self, input_tokens: usize, output_tokens: usize) -> f64 {
        estimate_cost_usd(
            input_tokens,
            output_tokens,
            self.config.price_input_per_token,
            self.config.price_output_per_token,
        )
    }

    /// Settings and derived ceilings, for diagnostics.
    pub fn summary(&self) -> LimitsSummary {
        LimitsSummary {
            budget_usd: self.config.budget_usd,
            reserved_output_tokens: self.config.reserved_output_tokens,
            price_input_per_token: self.config.price_input_per_token,
            price_output_per_token: self.config.price_output_per_token,
            model_context_tokens: self.config.model_context_tokens,
            safety_margin_tokens: self.config.safety_margin_tokens,
            max_input_tokens: self.limits.max_input_tokens,
            max_total_tokens: self.limits.max_total_tokens,
            min_tokens_per_section: self.config.min_tokens_per_section,
            tokenizer: self.tokenizer.name().to_string(),
        }
    }
}

/// Tail-cuts `text` so it measures at most `max_tokens` tokens.
///
/// Re-encoding a decoded prefix can yield more tokens than were kept with
/// byte-level BPEs, so the cut shrinks until the result measures in budget.
pub fn truncate_flat(tokenizer: &dyn Tokenizer, text: &str, max_tokens: usize) -> String {
    let tokens = tokenizer.encode(text);
    if tokens.len() <= max_tokens {
        return text.to_string();
    }
    let mut keep = max_tokens;
    loop {
        let (out, kept) = decode_prefix(tokenizer, &tokens, keep);
        if kept == 0 || tokenizer.count(&out) <= max_tokens {
            return out;
        }
        keep = kept - 1;
    }
}

/// Fits `text` into `max_input_tokens`, cutting section bodies in order
/// down to `min_tokens_per_section` before falling back to a flat cut.
pub fn truncate(
    tokenizer: &dyn Tokenizer,
    header_marker: &str,
    text: &str,
    max_input_tokens: usize,
    min_tokens_per_section: usize,
) -> String {
    let total = tokenizer.count(text);
    if total <= max_input_tokens {
        return text.to_string();
    }

    let sections = parse_sections(text, header_marker);
    if sections.is_empty() {
        log_fallback(total, max_input_tokens, "unstructured");
        return truncate_flat(tokenizer, text, max_input_tokens);
    }

    let overflow = total - max_input_tokens;
    let mut remaining = overflow;
    let mut reduced: Vec<Section> = Vec::with_capacity(sections.len());
    for section in sections {
        if remaining == 0 {
            reduced.push(section);
            continue;
        }
        let body_tokens = tokenizer.encode(&section.body);
        let reducible = body_tokens.len().saturating_sub(min_tokens_per_section);
        let cut = reducible.min(remaining);
        if cut == 0 {
            reduced.push(section);
            continue;
        }
        let (body, _) = decode_prefix(tokenizer, &body_tokens, body_tokens.len() - cut);
        remaining -= cut;
        reduced.push(Section {
            header: section.header,
            body,
        });
    }

    let joined = join_sections(&reduced);
    #[cfg(feature = "tracing")]
    tracing::debug!(
        total,
        max_input_tokens,
        overflow,
        remaining,
        "Truncated prompt sections"
    );

    if remaining > 0 {
        log_fallback(total, max_input_tokens, "section floors exhausted");
        return truncate_flat(tokenizer, &joined, max_input_tokens);
    }
    if tokenizer.count(&joined) > max_input_tokens {
        log_fallback(total, max_input_tokens, "rebuilt text over ceiling");
        return truncate_flat(tokenizer, &joined, max_input_tokens);
    }
    joined
}

fn log_fallback(total: usize, max_input_tokens: usize, reason: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(total, max_input_tokens, reason, "Global truncation fallback");

    #[cfg(not(feature = "tracing"))]
    let _ = (total, max_input_tokens, reason);
}
