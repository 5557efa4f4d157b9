//! Heuristic landmark guesses
//!
//! Pages that forget to mark up their main content or navigation often
//! still use conventional ids and classes for them. When a scan finds no
//! `main` (or no `navigation`), well-known ids and classes are tried and
//! matching elements are spliced into the list as guessed landmarks.

use crate::label::resolve_label;
use crate::role::{self, LandmarkRole};
use crate::scanner::ScanOutput;
use crate::selector::create_selector;
use crate::tree::TreeSource;
use crate::types::LandmarkRecord;
use std::cmp::Ordering;

/// Ids tried, in order, when no main landmark exists
pub const MAIN_IDS: &[&str] = &["main", "content", "main-content"];
/// Class accepted as main when exactly one element carries it
pub const MAIN_CLASS: &str = "main";
/// Ids tried, in order, when no navigation landmark exists
pub const NAVIGATION_IDS: &[&str] = &["navigation", "nav"];
/// Every element with one of these classes becomes a navigation guess
pub const NAVIGATION_CLASSES: &[&str] = &["navigation", "nav"];

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAugmenter;

impl HeuristicAugmenter {
    pub fn new() -> Self {
        Self
    }

    /// Add guesses to a fresh scan result
    pub fn augment<T: TreeSource>(&self, tree: &T, out: &mut ScanOutput<T::Node>) {
        self.find_main(tree, out);
        self.find_navigation(tree, out);
    }

    fn find_main<T: TreeSource>(&self, tree: &T, out: &mut ScanOutput<T::Node>) {
        if !out.main_indices.is_empty() {
            return;
        }
        for id in MAIN_IDS {
            if let Some(node) = tree.element_by_id(id) {
                if add_guess(tree, out, node, LandmarkRole::Main) {
                    return;
                }
            }
        }
        // Counted before any filtering: two `.main` elements mean neither is a guess
        if let [only] = tree.elements_by_class(MAIN_CLASS).as_slice() {
            add_guess(tree, out, *only, LandmarkRole::Main);
        }
    }

    fn find_navigation<T: TreeSource>(&self, tree: &T, out: &mut ScanOutput<T::Node>) {
        if out.found_navigation {
            return;
        }
        for id in NAVIGATION_IDS {
            if let Some(node) = tree.element_by_id(id) {
                if add_guess(tree, out, node, LandmarkRole::Navigation) {
                    break;
                }
            }
        }
        for class in NAVIGATION_CLASSES {
            for node in tree.elements_by_class(class) {
                add_guess(tree, out, node, LandmarkRole::Navigation);
            }
        }
    }
}

/// Insert a guessed record in document order; `false` if the node does not
/// qualify
fn add_guess<T: TreeSource>(
    tree: &T,
    out: &mut ScanOutput<T::Node>,
    node: T::Node,
    role: LandmarkRole,
) -> bool {
    if out.records.iter().any(|record| record.node == node) {
        return false;
    }
    if role::is_visually_hidden(tree, node) || role::is_semantically_hidden(tree, node) {
        return false;
    }
    let text = tree
        .rendered_text(node)
        .unwrap_or_else(|| tree.text_content(node));
    if text.trim().is_empty() {
        return false;
    }

    let insert_at = out
        .records
        .iter()
        .position(|record| tree.compare_document_position(node, record.node) == Ordering::Less)
        .unwrap_or(out.records.len());

    out.records.insert(
        insert_at,
        LandmarkRecord {
            depth: 0,
            role,
            explicit_role: false,
            role_description: role::role_description(tree, node),
            label: resolve_label(tree, node).map(|label| label.text),
            guessed: true,
            selector: create_selector(tree, node),
            node,
            warnings: Vec::new(),
        },
    );

    for index in out.main_indices.iter_mut() {
        if *index >= insert_at {
            *index += 1;
        }
    }
    match role {
        LandmarkRole::Main => out.main_indices = vec![insert_at],
        LandmarkRole::Navigation => out.found_navigation = true,
        _ => {}
    }

    tracing::trace!("[HeuristicAugmenter] guessed {} at {}", role, insert_at);
    true
}
