//! Chat-completion provider implementations for splitscore.
//!
//! All providers implement the `splitscore_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
