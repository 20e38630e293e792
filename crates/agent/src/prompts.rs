//! Built-in system instructions.
//!
//! Both are compiled into the binary; `ModelConfig::instructions_path` can
//! replace either at startup.

pub const SPLITTER_INSTRUCTIONS: &str = include_str!("../prompts/splitter_instructions.txt");

pub const EVALUATOR_INSTRUCTIONS: &str = include_str!("../prompts/evaluator_instructions.txt");

/// The trimmed built-in instruction, unless an override is given.
pub fn resolve(builtin: &str, override_text: Option<String>) -> String {
    override_text.unwrap_or_else(|| builtin.trim().to_string())
}
