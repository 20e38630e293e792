//! Token counting.
//!
//! `TiktokenCounter` uses the BPE of the target model, so the budget check
//! matches what the API will bill. `HeuristicCounter` is a character-based
//! estimate (~4 characters per token) for tests and unknown tokenizers.

use splitscore_core::Error;
use tiktoken_rs::CoreBPE;
use tracing::debug;

/// Counts tokens the way a particular model would.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Exact counts from the model's tiktoken encoding.
pub struct TiktokenCounter {
    model: String,
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Load the encoding for `model`, falling back to `o200k_base` for model
    /// names tiktoken does not know.
    pub fn for_model(model: &str) -> Result<Self, Error> {
        let bpe = match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => bpe,
            Err(e) => {
                debug!(model, error = %e, "Unknown model for tiktoken, using o200k_base");
                tiktoken_rs::o200k_base()
                    .map_err(|e| Error::Internal(format!("failed to load o200k_base: {e}")))?
            }
        };
        Ok(Self {
            model: model.to_string(),
            bpe,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

/// Character-based estimate: 1 token ≈ 4 bytes, rounded up.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCounter;

impl TokenCounter for HeuristicCounter {
    fn count(&self, text: &str) -> usize {
        estimate_tokens(text)
    }
}

/// Estimate the token count for a string.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}
