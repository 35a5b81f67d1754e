//! Token estimation for rendered prompts.

use tiktoken_rs::{CoreBPE, cl100k_base};

/// Average characters per token used when the BPE tables cannot be loaded.
const FALLBACK_CHARS_PER_TOKEN: usize = 4;

/// Estimates how many tokens a rendered prompt will cost.
pub struct TokenEstimator {
    bpe: Option<CoreBPE>,
}

impl TokenEstimator {
    /// Load the `cl100k_base` tokenizer, falling back to a character heuristic.
    pub fn new() -> Self {
        let bpe = match cl100k_base() {
            Ok(bpe) => Some(bpe),
            Err(err) => {
                tracing::warn!(error = %err, "tokenizer unavailable, using character heuristic");
                None
            }
        };
        Self { bpe }
    }

    /// Heuristic-only estimator.
    pub fn heuristic() -> Self {
        Self { bpe: None }
    }

    pub fn estimate(&self, text: &str) -> usize {
        match &self.bpe {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => text.chars().count().div_ceil(FALLBACK_CHARS_PER_TOKEN),
        }
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}
