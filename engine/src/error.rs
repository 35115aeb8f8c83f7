//! Error types for the synlist engine.

use crate::{Index, Term};
use thiserror::Error;

/// All possible errors from the synlist engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Resolution errors
    #[error("unknown term: {0}")]
    UnknownTerm(Term),

    #[error("index out of range: {index} (allocated: {len})")]
    IndexOutOfRange { index: Index, len: usize },

    #[error("index {0} was merged into another item")]
    MergedAway(Index),

    // Admission errors
    #[error("terms span multiple items: {0:?}")]
    InconsistentIndices(Vec<Index>),

    #[error("term '{term}' already belongs to item {existing}")]
    TermCollision { term: Term, existing: Index },

    #[error("empty term")]
    EmptyTerm,

    // CAS errors
    #[error("conflicting CAS numbers: existing {existing}, incoming {incoming}")]
    CasConflict { existing: String, incoming: String },

    #[error("malformed CAS number: {0}")]
    MalformedCas(String),

    // Query errors
    #[error("invalid search pattern: {0}")]
    InvalidPattern(String),

    // Document errors
    #[error("missing document field: {0}")]
    MissingSchemaField(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
