//! Landmark index and navigation cursor
//!
//! Holds the latest scan result and the user's position in it. The selected
//! landmark is remembered by node, so a rescan that shifts indices around
//! (say, a new banner inserted above it) keeps the selection on the same
//! element.

use crate::tree::TreeSource;
use crate::types::LandmarkRecord;
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct LandmarkIndex<N> {
    records: Vec<LandmarkRecord<N>>,
    main_indices: Vec<usize>,
    selected_index: Option<usize>,
    selected_node: Option<N>,
    /// Survives rescans; wrapped modulo the current main count
    main_pointer: Option<usize>,
}

impl<N> Default for LandmarkIndex<N> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            main_indices: Vec::new(),
            selected_index: None,
            selected_node: None,
            main_pointer: None,
        }
    }
}

impl<N: Copy + Eq> LandmarkIndex<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new scan result, re-finding the selected node
    pub fn replace(&mut self, records: Vec<LandmarkRecord<N>>, main_indices: Vec<usize>) {
        self.selected_index = self
            .selected_node
            .and_then(|node| records.iter().position(|record| record.node == node));
        self.records = records;
        self.main_indices = main_indices;
    }

    pub fn records(&self) -> &[LandmarkRecord<N>] {
        &self.records
    }

    pub fn main_indices(&self) -> &[usize] {
        &self.main_indices
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&LandmarkRecord<N>> {
        self.records.get(self.selected_index?)
    }

    /// Next landmark after the focused element, or after the current
    /// selection when focus is on `<body>`
    pub fn next<T>(&mut self, tree: &T) -> Option<&LandmarkRecord<N>>
    where
        T: TreeSource<Node = N>,
    {
        if self.records.is_empty() {
            return None;
        }
        let from_focus = focused(tree).and_then(|focus| {
            self.records.iter().position(|record| {
                tree.compare_document_position(focus, record.node) == Ordering::Less
            })
        });
        let index = from_focus
            .unwrap_or_else(|| self.selected_index.map_or(0, |i| i + 1) % self.records.len());
        self.select(index)
    }

    /// Mirror of [`LandmarkIndex::next`]
    pub fn previous<T>(&mut self, tree: &T) -> Option<&LandmarkRecord<N>>
    where
        T: TreeSource<Node = N>,
    {
        if self.records.is_empty() {
            return None;
        }
        let from_focus = focused(tree).and_then(|focus| {
            self.records.iter().rposition(|record| {
                tree.compare_document_position(record.node, focus) == Ordering::Less
            })
        });
        let index = from_focus.unwrap_or_else(|| match self.selected_index {
            None | Some(0) => self.records.len() - 1,
            Some(i) => i - 1,
        });
        self.select(index)
    }

    /// Select by position; out of range is a no-op
    pub fn by_index(&mut self, index: usize) -> Option<&LandmarkRecord<N>> {
        self.select(index)
    }

    /// Cycle through main landmarks
    pub fn main(&mut self) -> Option<&LandmarkRecord<N>> {
        if self.main_indices.is_empty() {
            return None;
        }
        let pointer = self
            .main_pointer
            .map_or(0, |p| (p + 1) % self.main_indices.len());
        self.main_pointer = Some(pointer);
        let index = self.main_indices[pointer];
        self.select(index)
    }

    fn select(&mut self, index: usize) -> Option<&LandmarkRecord<N>> {
        let record = self.records.get(index)?;
        self.selected_index = Some(index);
        self.selected_node = Some(record.node);
        Some(record)
    }
}

/// Active element, unless focus is just sitting on `<body>`
fn focused<T: TreeSource>(tree: &T) -> Option<T::Node> {
    tree.active_element().filter(|&focus| Some(focus) != tree.body())
}
