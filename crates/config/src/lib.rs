//! Configuration loading, validation, and management for splitscore.
//!
//! Loads configuration from `~/.splitscore/config.toml` (or an explicit
//! path), then applies `.env` and environment variable overrides. Validates
//! all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the chat-completions endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Optional organization id sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Root of `input/` and `output/`; defaults to `data/` beside the executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Model used to split messages
    #[serde(default = "ModelConfig::splitter")]
    pub splitter: ModelConfig,

    /// Model used to score split results
    #[serde(default = "ModelConfig::evaluator")]
    pub evaluator: ModelConfig,

    /// Oversized-message handling
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_request_timeout_secs() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("organization", &self.organization)
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("splitter", &self.splitter)
            .field("evaluator", &self.evaluator)
            .field("chunking", &self.chunking)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

/// One model role (splitter or evaluator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: String,

    #[serde(default)]
    pub temperature: f32,

    /// File whose contents replace the built-in system instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions_path: Option<PathBuf>,
}

impl ModelConfig {
    fn named(model: &str) -> Self {
        Self {
            model: model.into(),
            temperature: 0.0,
            instructions_path: None,
        }
    }

    pub fn splitter() -> Self {
        Self::named("gpt-4o-mini")
    }

    pub fn evaluator() -> Self {
        Self::named("gpt-4o")
    }

    /// Read the override instructions, if configured.
    pub fn load_instructions(&self) -> Result<Option<String>, ConfigError> {
        let Some(path) = &self.instructions_path else {
            return Ok(None);
        };
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(text.trim().to_string()))
    }
}

/// How messages over the token budget are cut into parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Fixed slices of `max_tokens` characters.
    #[default]
    Characters,
    /// Longest prefixes that stay within `max_tokens` tokens.
    TokenBounded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default)]
    pub strategy: ChunkStrategy,
}

fn default_max_tokens() -> usize {
    4000
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            strategy: ChunkStrategy::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.splitscore/config.toml).
    ///
    /// A `.env` file in the working directory is loaded first, then these
    /// environment variables override the file:
    /// - `SPLITSCORE_API_KEY` / `OPENAI_API_KEY`
    /// - `OPENAI_ORGANIZATION`
    /// - `OPENAI_MODEL` (splitter), `OPENAI_EVALUATOR_MODEL`
    /// - `OPENAI_BASE_URL`
    /// - `SPLITSCORE_DATA_DIR`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(&Self::config_dir().join("config.toml"))
    }

    /// Same as [`AppConfig::load`] but reading the file at `path`.
    pub fn load_with(path: &Path) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", env_file.display());
        }

        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides. `lookup` returns a variable's value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("SPLITSCORE_API_KEY").or_else(|| non_empty("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(org) = non_empty("OPENAI_ORGANIZATION") {
            self.organization = Some(org);
        }
        if let Some(model) = non_empty("OPENAI_MODEL") {
            self.splitter.model = model;
        }
        if let Some(model) = non_empty("OPENAI_EVALUATOR_MODEL") {
            self.evaluator.model = model;
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.api_url = url;
        }
        if let Some(dir) = non_empty("SPLITSCORE_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".splitscore")
    }

    /// Root data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Where input CSV files are looked up.
    pub fn input_dir(&self) -> PathBuf {
        self.data_dir().join("input")
    }

    /// Where workbooks are written.
    pub fn output_dir(&self) -> PathBuf {
        self.data_dir().join("output")
    }

    /// Create the output directory if needed and return it.
    pub fn ensure_output_dir(&self) -> Result<PathBuf, ConfigError> {
        let dir = self.output_dir();
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::CreateDirError {
            path: dir.clone(),
            reason: e.to_string(),
        })?;
        Ok(dir)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        for (role, model) in [("splitter", &self.splitter), ("evaluator", &self.evaluator)] {
            if !(0.0..=2.0).contains(&model.temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "{role}.temperature must be between 0.0 and 2.0"
                )));
            }
            if model.model.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{role}.model must not be empty"
                )));
            }
        }

        if self.chunking.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "chunking.max_tokens must be > 0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            organization: None,
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            splitter: ModelConfig::splitter(),
            evaluator: ModelConfig::evaluator(),
            chunking: ChunkingConfig::default(),
            data_dir: None,
        }
    }
}

/// `data/` next to the running executable, or under the working directory
/// when the executable path is unavailable.
fn default_data_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("data")
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {reason}", .path.display())]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {}: {reason}", .path.display())]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to create directory {}: {reason}", .path.display())]
    CreateDirError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
