//! Command line argument parsing using clap.

use crate::config::{Config, RegistryKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use synlist_engine::CasPolicy;

/// Look up and edit synonym registry documents
#[derive(Parser, Debug, Clone)]
#[command(name = "synlist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Look up and edit synonym registry documents")]
pub struct Args {
    /// Registry document (overrides SYNLIST_FILE)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Registry type: synlist or flowables (overrides SYNLIST_KIND)
    #[arg(short, long)]
    pub kind: Option<RegistryKind>,

    /// CAS conflict handling: strict or keep-first (overrides SYNLIST_CAS_POLICY)
    #[arg(long)]
    pub cas_policy: Option<CasPolicy>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Apply command-line overrides on top of the environment configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(file) = &self.file {
            config.file = file.clone();
        }
        if let Some(kind) = self.kind {
            config.kind = kind;
        }
        if let Some(policy) = self.cas_policy {
            config.cas_policy = policy;
        }
        config
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print every synonym of a term
    Lookup { term: String },

    /// Print the display name of a term's item
    Name { term: String },

    /// Print the CAS number of a term's item (flowables only)
    Cas { term: String },

    /// Case-insensitive regex search over all terms
    Search { pattern: String },

    /// Add a batch of terms
    Add {
        #[arg(required = true)]
        terms: Vec<String>,

        /// Add unknown terms to the one existing item the batch touches
        #[arg(long)]
        merge: bool,

        /// Canonical name for a newly created item
        #[arg(long)]
        name: Option<String>,
    },

    /// Merge the items of OTHERS into the item of DOMINANT
    Merge {
        dominant: String,
        #[arg(required = true)]
        others: Vec<String>,
    },

    /// Print item and term counts
    Stats,
}
