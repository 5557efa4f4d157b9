//! Landmark discovery for web documents
//!
//! Finds the ARIA landmark regions of a page (banner, navigation, main, ...),
//! keeps them in document order, and moves a selection cursor through them.
//!
//! ## Pipeline
//!
//! ```text
//! TreeSource ─→ TreeScanner ─→ HeuristicAugmenter ─→ LandmarkIndex
//!  (any tree)    role + label     id/class guesses     next / previous / main
//! ```
//!
//! [`LandmarkFinder`] wires the stages together for one document.
//!
//! ```
//! use dom::DomArena;
//! use landmarks::LandmarkFinder;
//!
//! let mut arena = DomArena::new_document();
//! let body = arena.body().unwrap();
//! let nav = arena.create_element_with("nav", &[("aria-label", "Primary")]);
//! arena.append_child(body, nav).unwrap();
//!
//! let mut finder = LandmarkFinder::new();
//! finder.find(&arena);
//! assert_eq!(finder.all_infos()[0].display_name(), "Primary (Navigation)");
//! ```

pub mod error;
pub mod finder;
pub mod heuristics;
pub mod index;
pub mod label;
pub mod role;
pub mod scanner;
pub mod selector;
pub mod tree;
pub mod types;

pub use error::{LandmarkError, Result};
pub use finder::{FinderConfig, LandmarkFinder};
pub use heuristics::HeuristicAugmenter;
pub use index::LandmarkIndex;
pub use label::{LabelSource, ResolvedLabel};
pub use role::{LandmarkRole, Resolution};
pub use scanner::{ScanOutput, TreeScanner};
pub use selector::{create_selector, resolve_selector};
pub use tree::TreeSource;
pub use types::{LandmarkInfo, LandmarkRecord, WarningKind};
