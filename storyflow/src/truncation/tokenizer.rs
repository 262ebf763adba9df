//! Tokenizers used to measure and cut prompts.
//!
//! `CharTokenizer` counts Unicode scalar values and round-trips exactly, which
//! makes it the reference tokenizer for tests. `TiktokenTokenizer` (feature
//! `tiktoken`) uses the BPE encoding of the configured model.

use super::error::TruncationError;

/// Encodes text to token ids and decodes id prefixes back to text.
///
/// `decode` of any prefix of `encode(text)` may fail for byte-level BPEs
/// (a cut inside a multi-byte character); callers back off one token.
pub trait Tokenizer: Send + Sync {
    /// Short name for logs (e.g. `"chars"`, `"cl100k_base"`).
    fn name(&self) -> &str;

    fn encode(&self, text: &str) -> Vec<usize>;

    fn decode(&self, tokens: &[usize]) -> Result<String, TruncationError>;

    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// One token per Unicode scalar value.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn name(&self) -> &str {
        "chars"
    }

    fn encode(&self, text: &str) -> Vec<usize> {
        text.chars().map(|c| c as usize).collect()
    }

    fn decode(&self, tokens: &[usize]) -> Result<String, TruncationError> {
        tokens
            .iter()
            .map(|&t| {
                u32::try_from(t)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| TruncationError::Tokenizer(format!("invalid char token {}", t)))
            })
            .collect()
    }

    fn count(&self, text: &str) -> usize {
        text.chars().count()
    }
}

#[cfg(feature = "tiktoken")]
mod tiktoken {
    use tiktoken_rs::CoreBPE;

    use super::{Tokenizer, TruncationError};

    /// BPE tokenizer for an OpenAI-style model.
    pub struct TiktokenTokenizer {
        name: String,
        bpe: CoreBPE,
    }

    impl TiktokenTokenizer {
        /// Encoding for `model`. Unknown models get `o200k_base`, then
        /// `cl100k_base` if that cannot be loaded.
        pub fn for_model(model: &str) -> Result<Self, TruncationError> {
            match tiktoken_rs::get_bpe_from_model(model) {
                Ok(bpe) => Ok(Self {
                    name: model.to_string(),
                    bpe,
                }),
                Err(_) => Self::o200k().or_else(|_| Self::cl100k()),
            }
        }

        /// The `o200k_base` encoding.
        pub fn o200k() -> Result<Self, TruncationError> {
            let bpe = tiktoken_rs::o200k_base()
                .map_err(|e| TruncationError::Tokenizer(e.to_string()))?;
            Ok(Self {
                name: "o200k_base".to_string(),
                bpe,
            })
        }

        /// The `cl100k_base` encoding.
        pub fn cl100k() -> Result<Self, TruncationError> {
            let bpe = tiktoken_rs::cl100k_base()
                .map_err(|e| TruncationError::Tokenizer(e.to_string()))?;
            Ok(Self {
                name: "cl100k_base".to_string(),
                bpe,
            })
        }
    }

    impl Tokenizer for TiktokenTokenizer {
        fn name(&self) -> &str {
            &self.name
        }

        fn encode(&self, text: &str) -> Vec<usize> {
            self.bpe.encode_ordinary(text)
        }

        fn decode(&self, tokens: &[usize]) -> Result<String, TruncationError> {
            self.bpe
                .decode(tokens.to_vec())
                .map_err(|e| TruncationError::Tokenizer(e.to_string()))
        }
    }
}

#[cfg(feature = "tiktoken")]
pub use self::tiktoken::TiktokenTokenizer;

/// Decodes the longest prefix of `tokens` of at most `keep` tokens that
/// decodes cleanly. Returns the text and the number of tokens kept.
pub(crate) fn decode_prefix(
    tokenizer: &dyn Tokenizer,
    tokens: &[usize],
    keep: usize,
) -> (String, usize) {
    let mut keep = keep.min(tokens.len());
    loop {
        match tokenizer.decode(&tokens[..keep]) {
            Ok(text) => return (text, keep),
            Err(_) if keep > 0 => keep -= 1,
            Err(_) => return (String::new(), 0),
        }
    }
}
