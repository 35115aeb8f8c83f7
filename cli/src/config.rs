//! Configuration management for the CLI.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use synlist_engine::CasPolicy;

/// Default document path when `SYNLIST_FILE` is unset.
pub const DEFAULT_FILE: &str = "synonyms.json";

/// Which registry type a document holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistryKind {
    SynList,
    #[default]
    Flowables,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKind::SynList => write!(f, "synlist"),
            RegistryKind::Flowables => write!(f, "flowables"),
        }
    }
}

impl FromStr for RegistryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "synlist" => Ok(RegistryKind::SynList),
            "flowables" => Ok(RegistryKind::Flowables),
            other => Err(format!("unknown registry kind: {other}")),
        }
    }
}

/// CLI configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Registry document path
    pub file: PathBuf,
    /// Registry type stored in the document
    pub kind: RegistryKind,
    /// CAS conflict handling for flowables
    pub cas_policy: CasPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let file = get("SYNLIST_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE));

        let kind = match get("SYNLIST_KIND") {
            Some(value) => value.parse().map_err(ConfigError::InvalidKind)?,
            None => RegistryKind::default(),
        };

        let cas_policy = match get("SYNLIST_CAS_POLICY") {
            Some(value) => value.parse().map_err(ConfigError::InvalidCasPolicy)?,
            None => CasPolicy::default(),
        };

        Ok(Self {
            file,
            kind,
            cas_policy,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid SYNLIST_KIND value: {0}")]
    InvalidKind(String),

    #[error("Invalid SYNLIST_CAS_POLICY value: {0}")]
    InvalidCasPolicy(String),
}
