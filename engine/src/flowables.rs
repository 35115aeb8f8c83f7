//! Flowables - a synonym registry for chemical substances.
//!
//! On top of the generic [`SynList`] behaviour, each item may carry one CAS
//! registry number, and terms longer than three characters also resolve
//! case-insensitively.
//!
//! ## CAS numbers
//!
//! A term in CAS shape is normalized and recorded as the item's CAS number.
//! Its trimmed spelling is admitted alongside it, so `000050-00-0` and
//! `50-00-0` resolve to the same item. An item never holds two different CAS
//! numbers; what happens on a conflict is governed by [`CasPolicy`].
//!
//! ## Case folding
//!
//! Terms of four or more characters are bound both as written and lowercased.
//! Shorter terms are exact-case only, so codes such as `NO` and `No` stay apart.

use crate::{
    cas::{looks_like_cas, Cas},
    error::Result,
    synlist::sanitize,
    Error, Index, Registry, SynList, SynonymEntry, Term,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Terms longer than this many characters are also bound lowercased.
pub const CASE_FOLD_MIN_EXCLUSIVE: usize = 3;

/// How conflicting CAS numbers are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CasPolicy {
    /// A second, different CAS number fails the operation (default)
    #[default]
    Strict,
    /// The first CAS number wins. In a merge the others are dropped; in an
    /// admission the conflicting number is kept as a plain synonym.
    KeepFirst,
}

impl fmt::Display for CasPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CasPolicy::Strict => write!(f, "strict"),
            CasPolicy::KeepFirst => write!(f, "keep-first"),
        }
    }
}

impl FromStr for CasPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(CasPolicy::Strict),
            "keep-first" | "keep_first" | "relaxed" => Ok(CasPolicy::KeepFirst),
            other => Err(format!("unknown CAS policy: {other}")),
        }
    }
}

/// Lookup keys and CAS outcome for one term, computed before anything is bound.
#[derive(Debug)]
struct Admission {
    keys: Vec<Term>,
    cas: Option<Cas>,
}

fn folds(term: &str) -> bool {
    term.chars().count() > CASE_FOLD_MIN_EXCLUSIVE
}

/// A synonym registry enforcing one CAS number per item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flowables {
    list: SynList,
    /// CAS number by item index; absent for items without one and for tombstones
    cas: BTreeMap<Index, Cas>,
    policy: CasPolicy,
}

impl Flowables {
    /// Create an empty registry with the strict CAS policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given CAS policy.
    pub fn with_policy(policy: CasPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// The CAS policy in effect.
    pub fn policy(&self) -> CasPolicy {
        self.policy
    }

    /// Build a registry with the given CAS policy from a document.
    ///
    /// Documents written after a [`CasPolicy::KeepFirst`] merge hold items
    /// with more than one CAS-shaped term and only load under that policy.
    pub fn from_document_with_policy(document: &Value, policy: CasPolicy) -> Result<Self> {
        let mut flowables = Self::with_policy(policy);
        flowables.load_document(document)?;
        Ok(flowables)
    }

    /// Build a registry with the given CAS policy from JSON text.
    pub fn from_json_with_policy(json: &str, policy: CasPolicy) -> Result<Self> {
        let document: Value =
            serde_json::from_str(json).map_err(|e| Error::InvalidDocument(e.to_string()))?;
        Self::from_document_with_policy(&document, policy)
    }

    /// Trimmed CAS number of the item owning `term`.
    pub fn cas(&self, term: &str) -> Result<Option<&str>> {
        let index = self.index(term)?;
        Ok(self.cas.get(&index).map(Cas::trimmed))
    }

    /// CAS number of the item at `index`.
    pub fn cas_at(&self, index: Index) -> Option<&Cas> {
        self.cas.get(&index)
    }

    /// Work out what admitting `term` to `index` would bind.
    ///
    /// `held` is the CAS number the target item has, or will have once the
    /// earlier terms of the same batch are in.
    fn plan(&self, term: &str, index: Option<Index>, held: Option<&Cas>) -> Result<Admission> {
        let term = sanitize(term);
        if term.is_empty() {
            return Err(Error::EmptyTerm);
        }

        let mut keys = vec![term.to_string()];
        if folds(term) {
            let lower = term.to_lowercase();
            if lower != term {
                keys.push(lower);
            }
        }

        let mut cas = None;
        if looks_like_cas(term) {
            let incoming = Cas::parse(term)?;
            match held {
                Some(existing) if *existing != incoming => match self.policy {
                    CasPolicy::Strict => {
                        return Err(Error::CasConflict {
                            existing: existing.trimmed().to_string(),
                            incoming: incoming.trimmed().to_string(),
                        })
                    }
                    CasPolicy::KeepFirst => {
                        tracing::warn!(
                            existing = %existing,
                            incoming = %incoming,
                            "keeping conflicting CAS number as a plain synonym"
                        );
                    }
                },
                _ => {
                    if !incoming.has_valid_check_digit() {
                        tracing::debug!(cas = %incoming, "CAS number fails check digit");
                    }
                    if incoming.trimmed() != term {
                        keys.push(incoming.trimmed().to_string());
                    }
                    cas = Some(incoming);
                }
            }
        }

        for key in &keys {
            self.list.check_key(key, index)?;
        }
        Ok(Admission { keys, cas })
    }
}

impl Registry for Flowables {
    const SCHEMA: &'static str = "Flowables";

    fn list(&self) -> &SynList {
        &self.list
    }

    fn list_mut(&mut self) -> &mut SynList {
        &mut self.list
    }

    /// Exact lookup, then lowercase for long terms, then the trimmed spelling
    /// of a CAS number.
    fn resolve(&self, term: &str) -> Option<Index> {
        let term = sanitize(term);
        if let Some(index) = self.list.lookup(term) {
            return Some(index);
        }
        if folds(term) {
            if let Some(index) = self.list.lookup(&term.to_lowercase()) {
                return Some(index);
            }
        }
        if looks_like_cas(term) {
            let cas = Cas::parse(term).ok()?;
            return self.list.lookup(cas.trimmed());
        }
        None
    }

    fn check_admission(&self, terms: &[&str], index: Option<Index>) -> Result<()> {
        if let Some(index) = index {
            self.list.item(index)?;
        }
        let mut held = index.and_then(|i| self.cas.get(&i)).cloned();
        for term in terms {
            let admission = self.plan(term, index, held.as_ref())?;
            if held.is_none() {
                held = admission.cas;
            }
        }
        Ok(())
    }

    fn admit(&mut self, term: &str, index: Index) -> Result<()> {
        self.list.item(index)?;
        let admission = self.plan(term, Some(index), self.cas.get(&index))?;
        if let Some(cas) = admission.cas {
            self.cas.insert(index, cas);
        }
        for key in &admission.keys {
            self.list.bind(key, index);
        }
        Ok(())
    }

    fn merge_indices(&mut self, into: Index, donors: &[Index]) -> Result<()> {
        let mut kept: Option<&Cas> = None;
        for index in std::iter::once(into).chain(donors.iter().copied()) {
            let Some(cas) = self.cas.get(&index) else {
                continue;
            };
            match kept {
                None => kept = Some(cas),
                Some(first) if first == cas => {}
                Some(first) => match self.policy {
                    CasPolicy::Strict => {
                        return Err(Error::CasConflict {
                            existing: first.trimmed().to_string(),
                            incoming: cas.trimmed().to_string(),
                        })
                    }
                    CasPolicy::KeepFirst => {
                        tracing::warn!(
                            kept = %first,
                            dropped = %cas,
                            donor = index,
                            "dropping CAS number in merge"
                        );
                    }
                },
            }
        }
        let kept = kept.cloned();

        self.list.merge_into(into, donors)?;
        for donor in donors {
            self.cas.remove(donor);
        }
        match kept {
            Some(cas) => self.cas.insert(into, cas),
            None => self.cas.remove(&into),
        };
        Ok(())
    }

    /// Entries with the recorded CAS spelling first, so that reloading under
    /// [`CasPolicy::KeepFirst`] keeps the same number.
    fn entries(&self) -> Vec<SynonymEntry> {
        self.list
            .live_items()
            .map(|(index, item)| {
                let mut entry = SynonymEntry::from(item);
                if let Some(cas) = self.cas.get(&index) {
                    entry
                        .synonyms
                        .sort_by_key(|term| Cas::parse(term).ok().as_ref() != Some(cas));
                }
                entry
            })
            .collect()
    }

    /// The trimmed CAS number when the item has one, otherwise the canonical name.
    fn name(&self, term: &str) -> Result<Option<&str>> {
        let index = self.index(term)?;
        match self.cas.get(&index) {
            Some(cas) => Ok(Some(cas.trimmed())),
            None => Ok(self.list.item(index)?.name()),
        }
    }
}
