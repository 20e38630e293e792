//! # splitscore core
//!
//! Domain types, traits, and error definitions shared by every splitscore
//! crate. This crate has no I/O of its own: it defines the records that flow
//! from the splitter to the evaluator and the `Provider` seam the processors
//! call through.

pub mod error;
pub mod message;
pub mod provider;
pub mod record;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProcessError, ProviderError, Result};
pub use message::{History, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use record::{Category, EvaluationResult, ScoreMetric, Scores, SplitResult};
