//! SynList - the generic synonym registry.
//!
//! Holds an append-only list of items and a map from every known term to the
//! index of the item that owns it. Merged-away items stay in the list as
//! tombstones so that indices handed out earlier never change meaning.

use crate::{
    error::Result, snapshot::SynonymEntry, Error, Index, Item, Registry, Term,
};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

/// Normalize a term before it is used as a lookup key.
pub fn sanitize(term: &str) -> &str {
    term.trim()
}

/// An ordered list of synonym sets with a term index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynList {
    /// Items by index; `None` marks a tombstone
    items: Vec<Option<Item>>,
    /// Every known term, mapped to its owning index
    terms: HashMap<Term, Index>,
}

impl SynList {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact lookup of a sanitized term.
    pub fn lookup(&self, term: &str) -> Option<Index> {
        self.terms.get(sanitize(term)).copied()
    }

    /// Get a live item by index.
    pub fn item(&self, index: Index) -> Result<&Item> {
        match self.items.get(index) {
            Some(Some(item)) => Ok(item),
            Some(None) => Err(Error::MergedAway(index)),
            None => Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            }),
        }
    }

    /// Iterate over live items in index order.
    pub fn live_items(&self) -> impl Iterator<Item = (Index, &Item)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|item| (index, item)))
    }

    /// Count of live items.
    pub fn live_count(&self) -> usize {
        self.items.iter().filter(|slot| slot.is_some()).count()
    }

    /// Count of allocated indices, tombstones included.
    pub fn slots(&self) -> usize {
        self.items.len()
    }

    /// Count of bound lookup keys.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Every bound lookup key, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    /// Linear scan of every known term. Returns the owning indices of matches.
    pub fn search_with(&self, pattern: &Regex) -> BTreeSet<Index> {
        self.terms
            .iter()
            .filter(|(term, _)| pattern.is_match(term))
            .map(|(_, index)| *index)
            .collect()
    }

    /// Export live items in index order.
    pub fn entries(&self) -> Vec<SynonymEntry> {
        self.live_items().map(|(_, item)| item.into()).collect()
    }

    /// Verify that none of `terms` is bound to an item other than `index`.
    ///
    /// With `index == None` the terms are destined for a fresh item, so any
    /// existing binding is a collision.
    pub(crate) fn check_collisions(&self, terms: &[&str], index: Option<Index>) -> Result<()> {
        if let Some(index) = index {
            self.item(index)?;
        }
        for term in terms {
            let key = sanitize(term);
            if key.is_empty() {
                return Err(Error::EmptyTerm);
            }
            self.check_key(key, index)?;
        }
        Ok(())
    }

    /// Verify a single, already sanitized key.
    pub(crate) fn check_key(&self, key: &str, index: Option<Index>) -> Result<()> {
        match self.terms.get(key) {
            Some(&existing) if Some(existing) != index => Err(Error::TermCollision {
                term: key.to_string(),
                existing,
            }),
            _ => Ok(()),
        }
    }

    /// Append an empty item and return its index.
    pub(crate) fn allocate(&mut self) -> Index {
        self.items.push(Some(Item::new()));
        self.items.len() - 1
    }

    /// Bind a term to a live item. Callers check for collisions first.
    pub(crate) fn bind(&mut self, term: &str, index: Index) {
        let key = sanitize(term);
        if self.terms.get(key) == Some(&index) {
            return;
        }
        if let Some(Some(item)) = self.items.get_mut(index) {
            item.insert(key.to_string());
            self.terms.insert(key.to_string(), index);
        }
    }

    /// Set the canonical name of a live item. The name must already be one of its terms.
    pub(crate) fn rename(&mut self, index: Index, name: &str) {
        if let Some(Some(item)) = self.items.get_mut(index) {
            item.name = Some(sanitize(name).to_string());
        }
    }

    /// Fold donor items into `into` and tombstone them.
    ///
    /// Every term of the surviving item is rebound to `into`, which repairs
    /// bindings that still pointed at a donor.
    pub(crate) fn merge_into(&mut self, into: Index, donors: &[Index]) -> Result<()> {
        self.item(into)?;
        for &donor in donors {
            if donor != into {
                self.item(donor)?;
            }
        }

        let mut absorbed = Vec::new();
        for &donor in donors {
            if donor == into {
                continue;
            }
            if let Some(item) = self.items[donor].take() {
                absorbed.push((donor, item));
            }
        }

        let Some(target) = self.items[into].as_mut() else {
            return Err(Error::MergedAway(into));
        };
        for (donor, item) in absorbed {
            tracing::debug!(
                donor,
                into,
                donor_terms = ?item.terms,
                target_terms = ?target.terms,
                "merging synonym set"
            );
            target.absorb(item);
        }
        for term in &target.terms {
            self.terms.insert(term.clone(), into);
        }
        Ok(())
    }
}

impl Registry for SynList {
    const SCHEMA: &'static str = "SynList";

    fn list(&self) -> &SynList {
        self
    }

    fn list_mut(&mut self) -> &mut SynList {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn set(terms: &[&str]) -> BTreeSet<Term> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn add_term_allocates_and_names() {
        let mut synlist = SynList::new();

        let index = synlist.add_term("bob the builder").unwrap();
        assert_eq!(index, 0);
        assert_eq!(synlist.name("bob the builder").unwrap(), Some("bob the builder"));
        assert_eq!(synlist.synonym_set(0).unwrap(), &set(&["bob the builder"]));
    }

    #[test]
    fn add_term_returns_existing_index() {
        let mut synlist = SynList::new();
        let first = synlist.add_term("water").unwrap();
        let second = synlist.add_term("  water ").unwrap();

        assert_eq!(first, second);
        assert_eq!(synlist.slots(), 1);
    }

    #[test]
    fn add_term_rejects_empty() {
        let mut synlist = SynList::new();
        assert_eq!(synlist.add_term("   "), Err(Error::EmptyTerm));
        assert_eq!(synlist.slots(), 0);
    }

    #[test]
    fn terms_are_trimmed() {
        let mut synlist = SynList::new();
        synlist.new_set(["  water ", "H2O"], None).unwrap();

        assert!(synlist.synonyms_for("water").unwrap().contains("water"));
        assert!(!synlist.synonyms_for("water").unwrap().contains("  water "));
        assert_eq!(synlist.name("H2O").unwrap(), Some("water"));
    }

    #[test]
    fn find_indices_buckets_unmatched() {
        let mut synlist = SynList::new();
        synlist.new_set(["water", "H2O"], None).unwrap();

        let found = synlist.find_indices(["water", "H2O", "ice"]);

        let mut expected = BTreeMap::new();
        expected.insert(Some(0), set(&["water", "H2O"]));
        expected.insert(None, set(&["ice"]));
        assert_eq!(found, expected);
    }

    #[test]
    fn new_set_drops_known_terms() {
        let mut synlist = SynList::new();
        synlist.new_set(["water", "H2O"], None).unwrap();

        let index = synlist.new_set(["H2O", "dihydrogen monoxide"], None).unwrap();
        assert_eq!(index, Some(1));
        assert_eq!(synlist.synonym_set(1).unwrap(), &set(&["dihydrogen monoxide"]));
        assert_eq!(synlist.index("H2O").unwrap(), 0);
        assert_eq!(synlist.name("dihydrogen monoxide").unwrap(), Some("dihydrogen monoxide"));
    }

    #[test]
    fn new_set_of_known_terms_creates_nothing() {
        let mut synlist = SynList::new();
        synlist.new_set(["water", "H2O"], None).unwrap();

        assert_eq!(synlist.new_set(["water"], None).unwrap(), None);
        assert_eq!(synlist.new_set(Vec::<&str>::new(), None).unwrap(), None);
        assert_eq!(synlist.slots(), 1);
    }

    #[test]
    fn new_set_with_explicit_name() {
        let mut synlist = SynList::new();
        let index = synlist
            .new_set(["Henry VII", "Arthur the Great"], Some("The Great Houdini"))
            .unwrap()
            .unwrap();

        assert_eq!(synlist.name("Henry VII").unwrap(), Some("The Great Houdini"));
        assert_eq!(synlist.index("The Great Houdini").unwrap(), index);
    }

    #[test]
    fn add_set_without_merge_shunts_to_new_item() {
        let mut synlist = SynList::new();
        synlist.new_set(["x"], None).unwrap();

        let index = synlist.add_set(["x", "z"], false, None).unwrap();
        assert_eq!(index, Some(1));
        assert_eq!(synlist.index("x").unwrap(), 0);
        assert_eq!(synlist.index("z").unwrap(), 1);
    }

    #[test]
    fn add_set_with_merge_extends_single_match() {
        let mut synlist = SynList::new();
        synlist.new_set(["x"], None).unwrap();

        let index = synlist.add_set(["x", "z"], true, None).unwrap();
        assert_eq!(index, Some(0));
        assert_eq!(synlist.synonym_set(0).unwrap(), &set(&["x", "z"]));
        assert_eq!(synlist.slots(), 1);
    }

    #[test]
    fn add_set_with_merge_rejects_ambiguous_batch() {
        let mut synlist = SynList::new();
        synlist.new_set(["x"], None).unwrap();
        synlist.new_set(["y"], None).unwrap();
        let before = synlist.clone();

        let result = synlist.add_set(["x", "y", "w"], true, None);
        assert_eq!(result, Err(Error::InconsistentIndices(vec![0, 1])));
        assert_eq!(synlist, before);
    }

    #[test]
    fn merge_unions_and_tombstones() {
        let mut synlist = SynList::new();
        synlist.new_set(["ethanol", "EtOH"], None).unwrap();
        synlist.new_set(["ethyl alcohol"], None).unwrap();
        synlist.new_set(["grain alcohol", "spirit"], None).unwrap();

        let into = synlist.merge("ethanol", &["ethyl alcohol", "spirit"]).unwrap();

        assert_eq!(into, 0);
        assert_eq!(synlist.len(), 1);
        assert_eq!(synlist.slots(), 3);
        assert_eq!(synlist.name("spirit").unwrap(), Some("ethanol"));
        assert_eq!(
            synlist.synonym_set(0).unwrap(),
            &set(&["ethanol", "EtOH", "ethyl alcohol", "grain alcohol", "spirit"])
        );
        assert_eq!(synlist.synonym_set(1), Err(Error::MergedAway(1)));
        assert_eq!(synlist.synonym_set(2), Err(Error::MergedAway(2)));
        assert!(synlist.are_synonyms("EtOH", "grain alcohol"));
    }

    #[test]
    fn merge_with_dominant_among_others() {
        let mut synlist = SynList::new();
        synlist.new_set(["a", "b"], None).unwrap();
        synlist.new_set(["c"], None).unwrap();

        let into = synlist.merge("a", &["b", "c", "a"]).unwrap();
        assert_eq!(into, 0);
        assert_eq!(synlist.synonym_set(0).unwrap(), &set(&["a", "b", "c"]));
    }

    #[test]
    fn merge_unknown_term_changes_nothing() {
        let mut synlist = SynList::new();
        synlist.new_set(["a"], None).unwrap();
        synlist.new_set(["b"], None).unwrap();
        let before = synlist.clone();

        assert_eq!(
            synlist.merge("a", &["b", "nope"]),
            Err(Error::UnknownTerm("nope".into()))
        );
        assert_eq!(synlist, before);
    }

    #[test]
    fn add_synonym_to_index() {
        let mut synlist = SynList::new();
        let index = synlist.add_term("water").unwrap();

        synlist.add_synonym(index, "aqua").unwrap();
        assert!(synlist.are_synonyms("water", "aqua"));

        // idempotent
        synlist.add_synonym(index, "aqua").unwrap();
        assert_eq!(synlist.synonym_set(index).unwrap().len(), 2);
    }

    #[test]
    fn add_synonym_collision() {
        let mut synlist = SynList::new();
        synlist.add_term("water").unwrap();
        let other = synlist.add_term("ice").unwrap();

        assert_eq!(
            synlist.add_synonym(other, "water"),
            Err(Error::TermCollision {
                term: "water".into(),
                existing: 0
            })
        );
        assert_eq!(synlist.index("water").unwrap(), 0);
    }

    #[test]
    fn add_synonym_to_bad_index() {
        let mut synlist = SynList::new();
        synlist.add_term("a").unwrap();
        synlist.add_term("b").unwrap();
        synlist.merge("a", &["b"]).unwrap();

        assert_eq!(
            synlist.add_synonym(5, "c"),
            Err(Error::IndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(synlist.add_synonym(1, "c"), Err(Error::MergedAway(1)));
        assert_eq!(synlist.synonyms_for("c"), None);
    }

    #[test]
    fn set_name_admits_and_renames() {
        let mut synlist = SynList::new();
        let index = synlist.new_set(["methanal", "formalin"], None).unwrap().unwrap();

        synlist.set_name(index, "formaldehyde").unwrap();
        assert_eq!(synlist.name("formalin").unwrap(), Some("formaldehyde"));
        assert!(synlist.synonym_set(index).unwrap().contains("formaldehyde"));
    }

    #[test]
    fn read_accessors_on_unknown_terms() {
        let synlist = SynList::new();

        assert_eq!(synlist.synonyms_for("ghost"), None);
        assert!(!synlist.are_synonyms("ghost", "ghost"));
        assert_eq!(synlist.name("ghost"), Err(Error::UnknownTerm("ghost".into())));
        assert_eq!(
            synlist.synonym_set(0),
            Err(Error::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn exact_case_only() {
        let mut synlist = SynList::new();
        synlist.add_term("Water").unwrap();

        assert_eq!(synlist.synonyms_for("water"), None);
        assert!(synlist.synonyms_for("Water").is_some());
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut synlist = SynList::new();
        synlist.new_set(["Ethanol", "ethyl alcohol"], None).unwrap();
        synlist.new_set(["Methanol", "methyl alcohol"], None).unwrap();
        synlist.new_set(["water"], None).unwrap();

        let hits = synlist.search("ALCOHOL").unwrap();
        assert_eq!(hits, [0, 1].into_iter().collect());

        let hits = synlist.search("^eth").unwrap();
        assert_eq!(hits, [0].into_iter().collect());

        assert!(matches!(synlist.search("("), Err(Error::InvalidPattern(_))));
    }

    #[test]
    fn search_after_merge_reports_survivor() {
        let mut synlist = SynList::new();
        synlist.new_set(["ethanol"], None).unwrap();
        synlist.new_set(["ethyl alcohol"], None).unwrap();
        synlist.merge("ethanol", &["ethyl alcohol"]).unwrap();

        assert_eq!(synlist.search("alcohol").unwrap(), [0].into_iter().collect());
    }
}
