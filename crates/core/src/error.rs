//! Error types for the splitscore domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! `ProcessError` is the per-item taxonomy the processors absorb into
//! error-shaped records; `Error` is for the plumbing around them.

use thiserror::Error;

/// The top-level error type for splitscore plumbing (config, files, wiring).
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Spreadsheet I/O ---
    #[error("Spreadsheet error: {message}")]
    Sheet { message: String },

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures talking to the language-model endpoint.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// `retry_after_secs` is the endpoint's `Retry-After` hint, when it sent one.
    #[error("Rate limited by provider{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    retry_after_secs
        .map(|secs| format!(", retry after {secs}s"))
        .unwrap_or_default()
}

/// Why a single split or evaluation could not produce a regular record.
#[derive(Debug, Clone, Error)]
pub enum ProcessError {
    /// The model call itself failed.
    #[error("{0}")]
    Upstream(#[from] ProviderError),

    /// The reply was not parseable JSON.
    #[error("invalid JSON response: {0}")]
    MalformedResponse(String),

    /// The reply (or input record) parsed but lacks a field or has the wrong type.
    #[error("{0}")]
    Schema(String),
}
