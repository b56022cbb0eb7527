//! Error types for rule loading.

use rulemodel_engine::RuleError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, parsing or validating rule sources.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Rule text could not be parsed. Positions are 1-based.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// A `[[rule]]` entry of a rule file is malformed.
    #[error("rule entry #{index}: {message}")]
    Entry { index: usize, message: String },

    #[error(transparent)]
    Rules(#[from] RuleError),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
