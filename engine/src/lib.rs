//! # Synlist Engine
//!
//! A registry of synonym sets: groups of interchangeable labels, such as the
//! names a chemical substance goes by, that can be looked up, merged, and
//! serialized.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine only transforms in-memory state and JSON values
//! - **Stable indices**: an item's index never changes and is never reused
//! - **All-or-nothing**: a failed call leaves the registry as it was
//!
//! ## Core Concepts
//!
//! ### Items
//!
//! An [`Item`] is one synonym group: a set of terms and a canonical name.
//! Items live in an append-only list. Merging tombstones the donor items in
//! place, so an index handed out once stays valid or reports
//! [`Error::MergedAway`].
//!
//! ### Registries
//!
//! The [`Registry`] trait provides every operation (admit, find, merge,
//! search, serialize) on top of a [`SynList`] and a small set of hooks:
//! - [`Registry::resolve`] - term to index
//! - [`Registry::check_admission`] / [`Registry::admit`] - term admission
//! - [`Registry::merge_indices`] - item merge
//!
//! [`SynList`] uses the defaults. [`Flowables`] overrides the hooks to track
//! one [`Cas`] number per item and to resolve long terms case-insensitively.
//!
//! ## Quick Start
//!
//! ```rust
//! use synlist_engine::{Flowables, Registry};
//!
//! let mut flowables = Flowables::new();
//! let index = flowables
//!     .add_set(["formaldehyde", "methanal", "50-00-0"], false, None)
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(flowables.index("Methanal").unwrap(), index);
//! assert_eq!(flowables.cas("formaldehyde").unwrap(), Some("50-00-0"));
//! assert_eq!(flowables.name("methanal").unwrap(), Some("50-00-0"));
//!
//! let json = flowables.to_json().unwrap();
//! let restored = Flowables::from_json(&json).unwrap();
//! assert!(restored.are_synonyms("methanal", "000050-00-0"));
//! ```

pub mod cas;
pub mod error;
pub mod flowables;
pub mod item;
pub mod registry;
pub mod snapshot;
pub mod synlist;

// Re-export main types at crate root
pub use cas::{looks_like_cas, Cas};
pub use error::Error;
pub use flowables::{CasPolicy, Flowables};
pub use item::Item;
pub use registry::{IndexMap, Registry};
pub use snapshot::SynonymEntry;
pub use synlist::{sanitize, SynList};

/// Type aliases for clarity
pub type Index = usize;
pub type Term = String;
