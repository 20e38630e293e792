//! The splitting and scoring pipeline.
//!
//! 1. **Count** a message's tokens with the target model's tokenizer
//! 2. **Chunk** messages over the budget into ordered parts
//! 3. **Split** each part with the splitter model (fresh history per part)
//! 4. **Combine** the per-part results into one record per input row
//! 5. **Evaluate** every record with the evaluator model
//! 6. **Summarize** the scores across the batch
//!
//! Processors never fail: every upstream, parse, or schema problem is turned
//! into an error-shaped record so a batch always yields one output per input.

pub mod chunker;
pub mod combiner;
pub mod evaluator;
pub mod prompts;
pub mod reply;
pub mod splitter;
pub mod summary;
pub mod tokens;

pub use chunker::Chunker;
pub use combiner::combine;
pub use evaluator::EvaluatorAgent;
pub use splitter::SplitterAgent;
pub use summary::{ATTENTION_THRESHOLD, ScoreSummary};
pub use tokens::{HeuristicCounter, TiktokenCounter, TokenCounter};

#[cfg(test)]
pub(crate) mod test_helpers;
