//! Oversize guard for messages that exceed the token budget.
//!
//! Messages within budget pass through as a single part. Longer ones are cut
//! into ordered parts whose concatenation is exactly the original text.
//! `ChunkStrategy::Characters` cuts fixed runs of `max_tokens` characters,
//! which bounds request size but not token count; `ChunkStrategy::TokenBounded`
//! re-measures each candidate part so every part fits the budget.

use std::sync::Arc;

use splitscore_config::{ChunkStrategy, ChunkingConfig};
use tracing::info;

use crate::tokens::TokenCounter;

/// Starting width of the token-bounded search window.
const INITIAL_CHARS_PER_TOKEN: usize = 8;

pub struct Chunker {
    counter: Arc<dyn TokenCounter>,
    max_tokens: usize,
    strategy: ChunkStrategy,
}

impl Chunker {
    /// A character-slicing chunker with the given budget.
    pub fn new(counter: Arc<dyn TokenCounter>, max_tokens: usize) -> Self {
        Self {
            counter,
            max_tokens: max_tokens.max(1),
            strategy: ChunkStrategy::Characters,
        }
    }

    pub fn from_config(counter: Arc<dyn TokenCounter>, config: &ChunkingConfig) -> Self {
        Self::new(counter, config.max_tokens).with_strategy(config.strategy)
    }

    pub fn with_strategy(mut self, strategy: ChunkStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn count(&self, text: &str) -> usize {
        self.counter.count(text)
    }

    /// Split `text` into parts. Always returns at least one part.
    pub fn split(&self, text: &str) -> Vec<String> {
        let tokens = self.counter.count(text);
        if tokens <= self.max_tokens {
            return vec![text.to_string()];
        }

        let parts = match self.strategy {
            ChunkStrategy::Characters => split_chars(text, self.max_tokens),
            ChunkStrategy::TokenBounded => self.split_token_bounded(text),
        };
        info!(
            tokens,
            max_tokens = self.max_tokens,
            parts = parts.len(),
            "Message too long, split into parts"
        );
        parts
    }

    /// Take the longest character prefix that stays within budget, repeatedly.
    ///
    /// The search window starts at `INITIAL_CHARS_PER_TOKEN` characters per
    /// budgeted token and doubles until its prefix is over budget or it covers
    /// the remainder, so each part measures text proportional to its own size.
    /// A part holds at least one character even if that character alone is
    /// over budget, so the loop always advances.
    fn split_token_bounded(&self, text: &str) -> Vec<String> {
        let mut parts = Vec::new();
        let mut rest = text;

        while !rest.is_empty() {
            let mut window = self.max_tokens.saturating_mul(INITIAL_CHARS_PER_TOKEN);
            // ends[k - 1] is the byte offset just past the k-th character.
            let (ends, fits) = loop {
                let ends: Vec<usize> = rest
                    .char_indices()
                    .map(|(i, _)| i)
                    .skip(1)
                    .chain(std::iter::once(rest.len()))
                    .take(window)
                    .collect();
                let last = ends.last().copied().unwrap_or(rest.len());
                let fits = self.counter.count(&rest[..last]) <= self.max_tokens;
                if !fits || last == rest.len() {
                    break (ends, fits);
                }
                window = window.saturating_mul(2);
            };

            if fits {
                parts.push(rest.to_string());
                break;
            }

            let (mut lo, mut hi) = (1, ends.len());
            while lo < hi {
                let mid = lo + (hi - lo).div_ceil(2);
                if self.counter.count(&rest[..ends[mid - 1]]) <= self.max_tokens {
                    lo = mid;
                } else {
                    hi = mid - 1;
                }
            }

            let end = ends[lo - 1];
            parts.push(rest[..end].to_string());
            rest = &rest[end..];
        }

        parts
    }
}

/// Consecutive runs of `size` characters; the last run may be shorter.
fn split_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|run| run.iter().collect())
        .collect()
}
