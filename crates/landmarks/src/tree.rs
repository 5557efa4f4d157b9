//! Tree source capability
//!
//! The scanner never owns the document. It reads it through [`TreeSource`],
//! which any host tree can implement. [`DomArena`] is the in-crate
//! implementation.

use dom::{utils, DomArena, NodeId};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

/// Read-only access to a live document
///
/// Node handles are cheap copies; a handle may outlive the node's attachment
/// to the document (see [`TreeSource::is_attached`]).
pub trait TreeSource {
    type Node: Copy + Eq + Hash + Debug;

    /// The root element (`<html>`)
    fn document_element(&self) -> Option<Self::Node>;

    fn body(&self) -> Option<Self::Node>;

    /// Element with keyboard focus, `<body>` when nothing is focused
    fn active_element(&self) -> Option<Self::Node>;

    /// `None` for nodes that are not elements
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    fn has_attribute(&self, node: Self::Node, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn parent_element(&self, node: Self::Node) -> Option<Self::Node>;

    fn element_children(&self, node: Self::Node) -> SmallVec<[Self::Node; 8]>;

    fn computed_style(&self, node: Self::Node, property: &str) -> Option<&str>;

    /// `Less` when `a` comes before `b` in document order
    fn compare_document_position(&self, a: Self::Node, b: Self::Node) -> Ordering;

    /// Inclusive: a node contains itself
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool;

    fn is_attached(&self, node: Self::Node) -> bool;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// All elements carrying `class`, in document order
    fn elements_by_class(&self, class: &str) -> Vec<Self::Node>;

    /// Rendered text (`innerText`), if the host can compute it
    fn rendered_text(&self, node: Self::Node) -> Option<String>;

    fn text_content(&self, node: Self::Node) -> String;
}

impl TreeSource for DomArena {
    type Node = NodeId;

    fn document_element(&self) -> Option<NodeId> {
        DomArena::document_element(self)
    }

    fn body(&self) -> Option<NodeId> {
        DomArena::body(self)
    }

    fn active_element(&self) -> Option<NodeId> {
        DomArena::active_element(self)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.get(node).ok()?.tag_name()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node).ok()?.attr(name)
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
            .ok()
            .flatten()
            .filter(|parent| parent.is_element())
            .map(|parent| parent.node_id)
    }

    fn element_children(&self, node: NodeId) -> SmallVec<[NodeId; 8]> {
        DomArena::element_children(self, node).unwrap_or_default()
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.get(node).ok()?.style(property)
    }

    fn compare_document_position(&self, a: NodeId, b: NodeId) -> Ordering {
        DomArena::compare_document_position(self, a, b)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        DomArena::contains(self, ancestor, node)
    }

    fn is_attached(&self, node: NodeId) -> bool {
        DomArena::is_attached(self, node)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_by_id(id)
    }

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.find_by_class(class)
    }

    fn rendered_text(&self, node: NodeId) -> Option<String> {
        utils::get_rendered_text(self, node).ok()
    }

    fn text_content(&self, node: NodeId) -> String {
        utils::get_text_content(self, node).unwrap_or_default()
    }
}
