//! Command execution against a registry document.

use crate::args::{Args, Command};
use crate::config::{Config, RegistryKind};
use crate::error::{CliError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use synlist_engine::{Error, Flowables, Registry, SynList};

/// Printed lines and whether the registry changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub lines: Vec<String>,
    pub modified: bool,
}

impl Outcome {
    fn read(lines: Vec<String>) -> Self {
        Self {
            lines,
            modified: false,
        }
    }

    fn write(lines: Vec<String>) -> Self {
        Self {
            lines,
            modified: true,
        }
    }
}

/// CAS access for the `cas` command, which only flowables support.
pub trait CasLookup: Registry {
    fn cas_of(&self, term: &str) -> Result<Option<String>>;
}

impl CasLookup for SynList {
    fn cas_of(&self, _term: &str) -> Result<Option<String>> {
        Err(CliError::Unsupported {
            kind: RegistryKind::SynList.to_string(),
            operation: "cas".to_string(),
        })
    }
}

impl CasLookup for Flowables {
    fn cas_of(&self, term: &str) -> Result<Option<String>> {
        Ok(self.cas(term)?.map(str::to_string))
    }
}

/// Resolve configuration, run the command, and return the lines to print.
pub fn execute(args: Args) -> Result<Vec<String>> {
    let config = args.apply(Config::from_env()?);
    tracing::debug!(
        file = %config.file.display(),
        kind = %config.kind,
        "resolved configuration"
    );

    match config.kind {
        RegistryKind::SynList => execute_with(SynList::new(), &config.file, &args.command),
        RegistryKind::Flowables => execute_with(
            Flowables::with_policy(config.cas_policy),
            &config.file,
            &args.command,
        ),
    }
}

fn execute_with<R: CasLookup>(
    mut registry: R,
    path: &Path,
    command: &Command,
) -> Result<Vec<String>> {
    load(&mut registry, path)?;
    let outcome = run(&mut registry, command)?;
    if outcome.modified {
        save(&registry, path)?;
    }
    Ok(outcome.lines)
}

/// Load a document into `registry`. A missing file leaves it empty.
pub fn load<R: Registry>(registry: &mut R, path: &Path) -> Result<()> {
    if !path.exists() {
        tracing::info!("{} not found, starting with an empty registry", path.display());
        return Ok(());
    }

    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: Value = serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    registry.load_document(&document)?;

    tracing::debug!(
        items = registry.len(),
        terms = registry.list().term_count(),
        "loaded registry"
    );
    Ok(())
}

/// Write `registry` to `path` as pretty JSON.
pub fn save<R: Registry>(registry: &R, path: &Path) -> Result<()> {
    let json = registry.to_json_pretty()?;
    fs::write(path, json).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(items = registry.len(), "saved {}", path.display());
    Ok(())
}

/// Run one command against an in-memory registry.
pub fn run<R: CasLookup>(registry: &mut R, command: &Command) -> Result<Outcome> {
    match command {
        Command::Lookup { term } => {
            let synonyms = registry
                .synonyms_for(term)
                .ok_or_else(|| Error::UnknownTerm(term.clone()))?;
            Ok(Outcome::read(synonyms.iter().cloned().collect()))
        }
        Command::Name { term } => {
            let name = registry.name(term)?.unwrap_or_default().to_string();
            Ok(Outcome::read(vec![name]))
        }
        Command::Cas { term } => {
            let cas = registry.cas_of(term)?.unwrap_or_else(|| "-".to_string());
            Ok(Outcome::read(vec![cas]))
        }
        Command::Search { pattern } => {
            let mut lines = Vec::new();
            for index in registry.search(pattern)? {
                let name = registry.list().item(index)?.name().unwrap_or_default();
                lines.push(format!("{index}\t{name}"));
            }
            Ok(Outcome::read(lines))
        }
        Command::Add { terms, merge, name } => {
            match registry.add_set(terms, *merge, name.as_deref())? {
                Some(index) => Ok(Outcome::write(vec![index.to_string()])),
                None => Ok(Outcome::read(vec!["no new terms".to_string()])),
            }
        }
        Command::Merge { dominant, others } => {
            let others: Vec<&str> = others.iter().map(String::as_str).collect();
            let into = registry.merge(dominant, &others)?;
            Ok(Outcome::write(vec![into.to_string()]))
        }
        Command::Stats => Ok(Outcome::read(vec![
            format!("items: {}", registry.len()),
            format!("slots: {}", registry.slots()),
            format!("terms: {}", registry.list().term_count()),
        ])),
    }
}
