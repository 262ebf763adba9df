//! Token ceilings derived from price, budget and model context.
//!
//! Pure arithmetic: `compute_limits` turns per-token prices, a per-call USD
//! budget, the output reservation and the model context into the input and
//! total token ceilings used by `PromptTruncator`.

use serde::Serialize;

use super::error::TruncationError;

/// Smallest input price used as divisor, so a zero price never divides by zero.
const MIN_PRICE: f64 = 1e-12;

/// Derived ceilings for one model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Limits {
    /// Maximum tokens the prompt may occupy.
    pub max_input_tokens: usize,
    /// Maximum prompt plus reserved output tokens.
    pub max_total_tokens: usize,
}

fn check_price(name: &'static str, value: f64) -> Result<f64, TruncationError> {
    if value.is_nan() || value < 0.0 {
        return Err(TruncationError::InvalidParameter {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Computes input and total token ceilings.
///
/// ```text
/// from_budget = max(0, floor((budget - price_out * reserved) / max(price_in, 1e-12)))
/// max_total   = min(context - margin, from_budget + reserved)
/// max_input   = max(0, min(from_budget, max_total - reserved))
/// ```
///
/// Subtractions saturate at zero. Prices and budget must be non-negative
/// numbers, otherwise `InvalidParameter` is returned.
pub fn compute_limits(
    price_in: f64,
    price_out: f64,
    budget: f64,
    reserved_output_tokens: usize,
    model_context_tokens: usize,
    safety_margin: usize,
) -> Result<Limits, TruncationError> {
    let price_in = check_price("price_in", price_in)?;
    let price_out = check_price("price_out", price_out)?;
    let budget = check_price("budget", budget)?;

    let spendable = budget - price_out * reserved_output_tokens as f64;
    let raw = (spendable / price_in.max(MIN_PRICE)).floor();
    // `as` saturates: negatives become 0, overflow becomes usize::MAX.
    let from_budget = if raw > 0.0 { raw as usize } else { 0 };

    let max_total_tokens = model_context_tokens
        .saturating_sub(safety_margin)
        .min(from_budget.saturating_add(reserved_output_tokens));
    let max_input_tokens = from_budget.min(max_total_tokens.saturating_sub(reserved_output_tokens));

    Ok(Limits {
        max_input_tokens,
        max_total_tokens,
    })
}

/// Estimated USD cost of one call.
pub fn estimate_cost_usd(
    input_tokens: usize,
    output_tokens: usize,
    price_in: f64,
    price_out: f64,
) -> f64 {
    input_tokens as f64 * price_in + output_tokens as f64 * price_out
}

/// Snapshot of every truncation setting plus the derived ceilings, for logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitsSummary {
    pub budget_usd: f64,
    pub reserved_output_tokens: usize,
    pub price_input_per_token: f64,
    pub price_output_per_token: f64,
    pub model_context_tokens: usize,
    pub safety_margin_tokens: usize,
    pub max_input_tokens: usize,
    pub max_total_tokens: usize,
    pub min_tokens_per_section: usize,
    pub tokenizer: String,
}
