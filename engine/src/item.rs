//! Item types for storing synonym groups.

use crate::Term;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One synonym group.
///
/// Terms are kept in a `BTreeSet` so that iteration, and therefore
/// serialization, has a deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// The group's synonyms, already sanitized
    pub terms: BTreeSet<Term>,
    /// Preferred term for the group
    pub name: Option<Term>,
}

impl Item {
    /// Create an empty item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical name, if one has been assigned.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Check whether the group holds a term.
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// Add a term, adopting it as the canonical name if the item has none yet.
    pub fn insert(&mut self, term: Term) {
        if self.name.is_none() {
            self.name = Some(term.clone());
        }
        self.terms.insert(term);
    }

    /// Absorb the terms of a donor item. The canonical name is left alone.
    pub fn absorb(&mut self, donor: Item) {
        self.terms.extend(donor.terms);
    }
}
