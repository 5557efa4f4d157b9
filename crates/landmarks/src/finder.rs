//! Landmark finder
//!
//! Facade over the scan pipeline: [`TreeScanner`] then, optionally,
//! [`HeuristicAugmenter`], with results kept in a [`LandmarkIndex`].
//! One finder per document.

use crate::heuristics::HeuristicAugmenter;
use crate::index::LandmarkIndex;
use crate::scanner::TreeScanner;
use crate::tree::TreeSource;
use crate::types::{LandmarkInfo, LandmarkRecord, WarningKind};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Finder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Guess main/navigation landmarks from ids and classes
    pub use_heuristics: bool,
    /// Collect authoring lints while scanning
    pub diagnostics: bool,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            use_heuristics: true,
            diagnostics: false,
        }
    }
}

#[derive(Debug)]
pub struct LandmarkFinder<N> {
    config: FinderConfig,
    scanner: TreeScanner,
    augmenter: HeuristicAugmenter,
    index: LandmarkIndex<N>,
    page_warnings: Vec<WarningKind>,
    last_scan: Option<Duration>,
}

impl<N: Copy + Eq> LandmarkFinder<N> {
    pub fn new() -> Self {
        Self::with_config(FinderConfig::default())
    }

    pub fn with_config(config: FinderConfig) -> Self {
        Self {
            config,
            scanner: TreeScanner::new(config.diagnostics),
            augmenter: HeuristicAugmenter::new(),
            index: LandmarkIndex::new(),
            page_warnings: Vec::new(),
            last_scan: None,
        }
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Switch lint collection on or off; takes effect on the next scan
    pub fn set_diagnostics(&mut self, diagnostics: bool) {
        self.config.diagnostics = diagnostics;
        self.scanner = TreeScanner::new(diagnostics);
    }

    /// Rescan the document, returning how long it took
    pub fn find<T>(&mut self, tree: &T) -> Duration
    where
        T: TreeSource<Node = N>,
    {
        let start = Instant::now();

        let mut out = self.scanner.scan(tree);
        if self.config.use_heuristics {
            self.augmenter.augment(tree, &mut out);
        }
        self.page_warnings = out.page_warnings;
        self.index.replace(out.records, out.main_indices);

        let elapsed = start.elapsed();
        self.last_scan = Some(elapsed);
        debug!(
            "[LandmarkFinder] Found {} landmarks in {:?}",
            self.index.len(),
            elapsed
        );
        elapsed
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn last_scan_duration(&self) -> Option<Duration> {
        self.last_scan
    }

    /// Every landmark, without node handles
    pub fn all_infos(&self) -> Vec<LandmarkInfo> {
        self.index.records().iter().map(LandmarkRecord::info).collect()
    }

    /// Every landmark, with node handles
    pub fn all_records(&self) -> &[LandmarkRecord<N>] {
        self.index.records()
    }

    pub fn page_warnings(&self) -> &[WarningKind] {
        &self.page_warnings
    }

    pub fn selected(&self) -> Option<&LandmarkRecord<N>> {
        self.index.selected()
    }

    // Navigation. Records whose node has left the document are never
    // handed out for focusing.

    pub fn next<T>(&mut self, tree: &T) -> Option<&LandmarkRecord<N>>
    where
        T: TreeSource<Node = N>,
    {
        self.index.next(tree).filter(|r| tree.is_attached(r.node))
    }

    pub fn previous<T>(&mut self, tree: &T) -> Option<&LandmarkRecord<N>>
    where
        T: TreeSource<Node = N>,
    {
        self.index.previous(tree).filter(|r| tree.is_attached(r.node))
    }

    pub fn main<T>(&mut self, tree: &T) -> Option<&LandmarkRecord<N>>
    where
        T: TreeSource<Node = N>,
    {
        self.index.main().filter(|r| tree.is_attached(r.node))
    }

    pub fn by_index<T>(&mut self, tree: &T, index: usize) -> Option<&LandmarkRecord<N>>
    where
        T: TreeSource<Node = N>,
    {
        self.index.by_index(index).filter(|r| tree.is_attached(r.node))
    }
}

impl<N: Copy + Eq> Default for LandmarkFinder<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::LandmarkRole;
    use dom::{DomArena, NodeId};

    #[test]
    fn test_heuristics_can_be_disabled() {
        let mut arena = DomArena::new_document();
        let body = arena.body().unwrap();
        let content = arena.create_element_with("div", &[("id", "content")]);
        let text = arena.create_text("Story");
        arena.append_child(content, text).unwrap();
        arena.append_child(body, content).unwrap();

        let mut guessing: LandmarkFinder<NodeId> = LandmarkFinder::new();
        guessing.find(&arena);
        assert_eq!(guessing.len(), 1);
        assert_eq!(guessing.all_infos()[0].role, LandmarkRole::Main);

        let mut strict = LandmarkFinder::with_config(FinderConfig {
            use_heuristics: false,
            diagnostics: false,
        });
        strict.find(&arena);
        assert!(strict.is_empty());
    }

    #[test]
    fn test_toggle_diagnostics() {
        let arena = DomArena::new_document();
        let mut finder: LandmarkFinder<NodeId> = LandmarkFinder::new();
        finder.find(&arena);
        assert!(finder.page_warnings().is_empty());

        finder.set_diagnostics(true);
        finder.find(&arena);
        assert_eq!(finder.page_warnings(), &[WarningKind::LintNoMain]);
        assert!(finder.last_scan_duration().is_some());
    }

    #[test]
    fn test_stale_record_is_not_handed_out() {
        let mut arena = DomArena::new_document();
        let body = arena.body().unwrap();
        let nav = arena.create_element("nav");
        arena.append_child(body, nav).unwrap();

        let mut finder: LandmarkFinder<NodeId> = LandmarkFinder::new();
        finder.find(&arena);
        arena.detach(nav).unwrap();

        assert!(finder.by_index(&arena, 0).is_none());
        assert!(finder.next(&arena).is_none());
    }
}
