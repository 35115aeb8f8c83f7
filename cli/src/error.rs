//! Unified error handling for the CLI.

use crate::config::ConfigError;
use std::path::PathBuf;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Engine(#[from] synlist_engine::Error),

    #[error("Failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not supported for {kind} documents: {operation}")]
    Unsupported { kind: String, operation: String },
}

/// Result type alias for commands.
pub type Result<T> = std::result::Result<T, CliError>;
