//! Tree scanner
//!
//! Walks the document in pre-order from the root element and collects every
//! element that [`role::resolve`] accepts as a landmark. The walk itself uses
//! an explicit stack rather than recursion. Trees loaded from CDP JSON are
//! still limited in depth by `serde_json`'s parser recursion limit.
//!
//! With diagnostics enabled, the scanner also lints the page:
//! - `lintDuplicateUnlabelled` on every unlabelled landmark whose role is
//!   shared by another unlabelled landmark
//! - `lintManyVisibleMainElements` on each implicit `<main>` when there is
//!   more than one
//! - `lintNoMain` / `lintManyMains` for the page as a whole

use crate::role::{self, LandmarkRole, Resolution};
use crate::selector::create_selector;
use crate::tree::TreeSource;
use crate::types::{LandmarkRecord, WarningKind};
use ahash::AHashMap;

/// Everything one scan produces
#[derive(Debug, Clone)]
pub struct ScanOutput<N> {
    /// Landmarks in document order
    pub records: Vec<LandmarkRecord<N>>,
    /// Indices into `records` of every `main` landmark
    pub main_indices: Vec<usize>,
    pub found_navigation: bool,
    /// Page-level lints, empty unless diagnostics are on
    pub page_warnings: Vec<WarningKind>,
}

impl<N> Default for ScanOutput<N> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            main_indices: Vec::new(),
            found_navigation: false,
            page_warnings: Vec::new(),
        }
    }
}

/// Pre-order landmark classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeScanner {
    diagnostics: bool,
}

struct Frame<N> {
    node: N,
    depth: usize,
    parent_landmark: Option<N>,
}

impl TreeScanner {
    pub fn new(diagnostics: bool) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    /// Scan the whole document
    pub fn scan<T: TreeSource>(&self, tree: &T) -> ScanOutput<T::Node> {
        let mut out = ScanOutput::default();
        let mut lints = self.diagnostics.then(LintCollector::default);

        let Some(root) = tree.document_element() else {
            return out;
        };

        let mut stack = vec![Frame {
            node: root,
            depth: 0,
            parent_landmark: None,
        }];

        while let Some(Frame {
            node,
            mut depth,
            mut parent_landmark,
        }) = stack.pop()
        {
            match role::resolve(tree, node) {
                Resolution::Hidden => continue,
                Resolution::NotLandmark => {}
                Resolution::Landmark(resolved) => {
                    if parent_landmark.is_some_and(|parent| tree.contains(parent, node)) {
                        depth += 1;
                    }

                    let index = out.records.len();
                    let label = resolved.label.map(|label| label.text);
                    if let Some(lints) = lints.as_mut() {
                        lints.observe(index, resolved.role, resolved.explicit, label.is_none());
                    }
                    match resolved.role {
                        LandmarkRole::Main => out.main_indices.push(index),
                        LandmarkRole::Navigation => out.found_navigation = true,
                        _ => {}
                    }

                    out.records.push(LandmarkRecord {
                        depth,
                        role: resolved.role,
                        explicit_role: resolved.explicit,
                        role_description: resolved.role_description,
                        label,
                        guessed: false,
                        selector: create_selector(tree, node),
                        node,
                        warnings: Vec::new(),
                    });
                    parent_landmark = Some(node);
                }
            }

            // Reverse so children pop left-to-right
            for &child in tree.element_children(node).iter().rev() {
                stack.push(Frame {
                    node: child,
                    depth,
                    parent_landmark,
                });
            }
        }

        if let Some(lints) = lints {
            lints.apply(&mut out);
        }

        tracing::trace!(
            "[TreeScanner] {} landmarks, {} main",
            out.records.len(),
            out.main_indices.len()
        );
        out
    }
}

/// Collected during the walk, applied once it ends
#[derive(Default)]
struct LintCollector {
    unlabelled: AHashMap<LandmarkRole, Vec<usize>>,
    visible_mains: Vec<usize>,
}

impl LintCollector {
    fn observe(&mut self, index: usize, role: LandmarkRole, explicit: bool, unlabelled: bool) {
        if unlabelled {
            self.unlabelled.entry(role).or_default().push(index);
        }
        // Hidden elements never reach here
        if role == LandmarkRole::Main && !explicit {
            self.visible_mains.push(index);
        }
    }

    fn apply<N>(self, out: &mut ScanOutput<N>) {
        match out.main_indices.len() {
            0 => out.page_warnings.push(WarningKind::LintNoMain),
            1 => {}
            _ => out.page_warnings.push(WarningKind::LintManyMains),
        }

        if self.visible_mains.len() > 1 {
            for &index in &self.visible_mains {
                out.records[index]
                    .warnings
                    .push(WarningKind::LintManyVisibleMainElements);
            }
        }

        for indices in self.unlabelled.values().filter(|indices| indices.len() > 1) {
            for &index in indices {
                out.records[index]
                    .warnings
                    .push(WarningKind::LintDuplicateUnlabelled);
            }
        }
    }
}
