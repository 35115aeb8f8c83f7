//! The `Registry` trait.
//!
//! A registry owns a [`SynList`] and may override how terms resolve to
//! indices, how terms are admitted, and how items merge. Every public
//! operation is a provided method written against those hooks, so all
//! registries share the same sequence of checks and failure points.
//!
//! Batch operations call [`Registry::check_admission`] on the whole batch
//! before the first term is bound; a failed call leaves the registry as it
//! was.

use crate::{
    error::Result,
    snapshot::{self, SynonymEntry},
    synlist::sanitize,
    Error, Index, SynList, Term,
};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Terms classified by owning item; the `None` bucket holds unmatched terms.
pub type IndexMap = BTreeMap<Option<Index>, BTreeSet<Term>>;

/// A synonym registry.
pub trait Registry {
    /// Name of the top-level document field holding this registry's items.
    const SCHEMA: &'static str;

    /// Underlying storage.
    fn list(&self) -> &SynList;

    /// Underlying storage, mutably.
    fn list_mut(&mut self) -> &mut SynList;

    // ------------------------------------------------------------------
    // Extension points
    // ------------------------------------------------------------------

    /// Resolve a term to the index of its live item.
    fn resolve(&self, term: &str) -> Option<Index> {
        self.list().lookup(term)
    }

    /// Validate that `terms` can all be admitted to `index` (or to a fresh
    /// item when `index` is `None`) without mutating anything.
    fn check_admission(&self, terms: &[&str], index: Option<Index>) -> Result<()> {
        self.list().check_collisions(terms, index)
    }

    /// Admit a single term to a live item.
    ///
    /// Admitting a term the item already holds is a no-op.
    fn admit(&mut self, term: &str, index: Index) -> Result<()> {
        self.check_admission(&[term], Some(index))?;
        self.list_mut().bind(term, index);
        Ok(())
    }

    /// Fold `donors` into `into`. Donors never contain `into`.
    fn merge_indices(&mut self, into: Index, donors: &[Index]) -> Result<()> {
        self.list_mut().merge_into(into, donors)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Number of live items.
    fn len(&self) -> usize {
        self.list().live_count()
    }

    /// Check if the registry has no live items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of allocated indices, tombstones included.
    fn slots(&self) -> usize {
        self.list().slots()
    }

    /// Every known lookup key.
    fn all_terms(&self) -> impl Iterator<Item = &str> {
        self.list().keys()
    }

    /// Index of the item owning `term`.
    fn index(&self, term: &str) -> Result<Index> {
        self.resolve(term)
            .ok_or_else(|| Error::UnknownTerm(sanitize(term).to_string()))
    }

    /// Classify each term by the index of the item that owns it.
    fn find_indices<I, S>(&self, terms: I) -> IndexMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut found = IndexMap::new();
        for term in terms {
            let term = sanitize(term.as_ref());
            if term.is_empty() {
                continue;
            }
            found
                .entry(self.resolve(term))
                .or_default()
                .insert(term.to_string());
        }
        found
    }

    /// Display name for the item owning `term`.
    fn name(&self, term: &str) -> Result<Option<&str>> {
        self.canonical_name(term)
    }

    /// Canonical name for the item owning `term`.
    fn canonical_name(&self, term: &str) -> Result<Option<&str>> {
        let index = self.index(term)?;
        Ok(self.list().item(index)?.name())
    }

    /// All synonyms of `term`, or `None` if the term is unknown.
    fn synonyms_for(&self, term: &str) -> Option<&BTreeSet<Term>> {
        let index = self.resolve(term)?;
        self.list().item(index).ok().map(|item| &item.terms)
    }

    /// Check whether two terms belong to the same live item.
    fn are_synonyms(&self, first: &str, second: &str) -> bool {
        match (self.resolve(first), self.resolve(second)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Case-insensitive regular expression scan over every known term.
    ///
    /// No lexical index is kept: this visits every term, O(total terms).
    fn search(&self, pattern: &str) -> Result<BTreeSet<Index>> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidPattern(e.to_string()))?;
        Ok(self.search_with(&pattern))
    }

    /// [`Registry::search`] with a caller-compiled matcher.
    fn search_with(&self, pattern: &Regex) -> BTreeSet<Index> {
        self.list().search_with(pattern)
    }

    /// Terms of the item at `index`.
    fn synonym_set(&self, index: Index) -> Result<&BTreeSet<Term>> {
        self.list().item(index).map(|item| &item.terms)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Return the index of a known term, or create a new item named after it.
    fn add_term(&mut self, term: &str) -> Result<Index> {
        if let Some(index) = self.resolve(term) {
            return Ok(index);
        }
        let term = sanitize(term);
        if term.is_empty() {
            return Err(Error::EmptyTerm);
        }
        self.check_admission(&[term], None)?;
        let index = self.list_mut().allocate();
        self.admit(term, index)?;
        Ok(index)
    }

    /// Create an item from the terms not already known anywhere.
    ///
    /// Known terms are silently dropped. The name, when given, is admitted
    /// first and becomes canonical; otherwise the first admitted term does.
    /// A name already owned by another item fails with
    /// [`Error::TermCollision`]. Returns `None` when nothing is left to admit.
    fn new_set<I, S>(&mut self, terms: I, name: Option<&str>) -> Result<Option<Index>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(name) = name.map(sanitize) {
            if let Some(existing) = self.resolve(name) {
                return Err(Error::TermCollision {
                    term: name.to_string(),
                    existing,
                });
            }
        }

        let candidates: Vec<Term> = name
            .into_iter()
            .map(str::to_string)
            .chain(terms.into_iter().map(|t| t.as_ref().to_string()))
            .collect();

        let mut fresh: Vec<&str> = Vec::new();
        for term in &candidates {
            let term = sanitize(term);
            if term.is_empty() || fresh.contains(&term) || self.resolve(term).is_some() {
                continue;
            }
            fresh.push(term);
        }
        if fresh.is_empty() {
            return Ok(None);
        }

        self.check_admission(&fresh, None)?;
        let index = self.list_mut().allocate();
        for term in &fresh {
            self.admit(term, index)?;
        }
        Ok(Some(index))
    }

    /// Add a batch of terms.
    ///
    /// Without `merge`, unknown terms form a new item. With `merge`, they
    /// join the single existing item the batch already touches; a batch
    /// touching several items is rejected with
    /// [`Error::InconsistentIndices`].
    fn add_set<I, S>(&mut self, terms: I, merge: bool, name: Option<&str>) -> Result<Option<Index>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<Term> = terms.into_iter().map(|t| t.as_ref().to_string()).collect();
        let found = self.find_indices(&terms);
        let owned: Vec<Index> = found.keys().flatten().copied().collect();

        if merge {
            match owned.as_slice() {
                [] => {}
                [index] => {
                    let index = *index;
                    let unmatched: Vec<&str> = found
                        .get(&None)
                        .map(|set| set.iter().map(String::as_str).collect())
                        .unwrap_or_default();
                    self.check_admission(&unmatched, Some(index))?;
                    for term in &unmatched {
                        self.admit(term, index)?;
                    }
                    return Ok(Some(index));
                }
                _ => return Err(Error::InconsistentIndices(owned)),
            }
        }

        self.new_set(&terms, name)
    }

    /// Merge the items of `others` into the item of `dominant`.
    ///
    /// All terms resolve before anything changes. The dominant item keeps
    /// its canonical name; donor items become tombstones.
    fn merge(&mut self, dominant: &str, others: &[&str]) -> Result<Index> {
        let into = self.index(dominant)?;
        let mut donors: Vec<Index> = Vec::new();
        for term in others {
            let index = self.index(term)?;
            if index != into && !donors.contains(&index) {
                donors.push(index);
            }
        }
        if !donors.is_empty() {
            self.merge_indices(into, &donors)?;
        }
        Ok(into)
    }

    /// Admit `term` into the item at `index`.
    fn add_synonym(&mut self, index: Index, term: &str) -> Result<()> {
        self.list().item(index)?;
        self.admit(term, index)
    }

    /// Add terms as synonyms of each other, merging into the item they already share.
    fn add_synonyms(&mut self, terms: &[&str]) -> Result<Option<Index>> {
        self.add_set(terms.iter().copied(), true, None)
    }

    /// Make `name` the canonical name of the item at `index`, admitting it first.
    fn set_name(&mut self, index: Index, name: &str) -> Result<()> {
        self.admit(name, index)?;
        self.list_mut().rename(index, name);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Live items as document entries, in index order.
    fn entries(&self) -> Vec<SynonymEntry> {
        self.list().entries()
    }

    /// Encode the registry as a document keyed by [`Registry::SCHEMA`].
    fn to_document(&self) -> Result<Value> {
        snapshot::encode(Self::SCHEMA, self.entries())
    }

    /// Serialize to JSON.
    fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.to_document()?)
            .map_err(|e| Error::InvalidDocument(e.to_string()))
    }

    /// Serialize to pretty JSON.
    fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_document()?)
            .map_err(|e| Error::InvalidDocument(e.to_string()))
    }

    /// Load every entry of a document into this registry.
    fn load_document(&mut self, document: &Value) -> Result<()> {
        for (n, entry) in snapshot::decode(Self::SCHEMA, document)?
            .into_iter()
            .enumerate()
        {
            let name = entry.name.as_deref();
            let index = self.add_set(&entry.synonyms, false, name)?.ok_or_else(|| {
                Error::InvalidDocument(format!("entry {n} has no terms that are not already known"))
            })?;
            if let Some(name) = name {
                self.set_name(index, name)?;
            }
        }
        Ok(())
    }

    /// Build a fresh registry from a document.
    fn from_document(document: &Value) -> Result<Self>
    where
        Self: Default,
    {
        let mut registry = Self::default();
        registry.load_document(document)?;
        Ok(registry)
    }

    /// Build a fresh registry from JSON text.
    fn from_json(json: &str) -> Result<Self>
    where
        Self: Default,
    {
        let document: Value =
            serde_json::from_str(json).map_err(|e| Error::InvalidDocument(e.to_string()))?;
        Self::from_document(&document)
    }
}
