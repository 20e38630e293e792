//! splitscore: message splitting and evaluation pipeline.
//!
//! The binary wires configuration, the model provider, and the two
//! processors into a [`Pipeline`](pipeline::Pipeline); the pipeline itself is
//! exposed here so it can be driven with any [`Provider`](splitscore_core::Provider).

pub mod pipeline;

pub use pipeline::{OutputNames, Pipeline, RunReport};
