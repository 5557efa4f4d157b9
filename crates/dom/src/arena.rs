//! Arena-based DOM tree storage
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```
//!
//! Nodes are never freed. Removing a node from the tree only detaches it,
//! so a `NodeId` held by a consumer stays valid and can be checked with
//! [`DomArena::is_attached`].

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};
use ahash::AHashMap;
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Arena allocator for DOM nodes
///
/// Design:
/// - Single Vec<DomNode> for sequential allocation
/// - HashMap for backend_node_id → NodeId lookup (CDP uses backend IDs)
/// - No Rc/Arc: use indices everywhere
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// Backend node ID → NodeId lookup (for CDP integration)
    backend_id_map: AHashMap<u32, NodeId>,

    /// Root node ID (if set)
    root_id: Option<NodeId>,

    /// Element holding keyboard focus (if any)
    active_id: Option<NodeId>,

    /// Next backend ID handed out to nodes created locally
    next_backend_id: u32,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(1024) // Pre-allocate for typical page
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            backend_id_map: AHashMap::with_capacity(capacity),
            root_id: None,
            active_id: None,
            next_backend_id: 1,
        }
    }

    /// Create `#document > HTML > (HEAD, BODY)`, the shape every page has
    pub fn new_document() -> Self {
        let mut arena = Self::new();
        let doc = arena.add_node(DomNode::new(0, 0, NodeType::Document, "#document".into()));
        arena.root_id = Some(doc);

        let html = arena.create_element("html");
        let head = arena.create_element("head");
        let body = arena.create_element("body");
        // Fresh nodes, no cycles possible
        let _ = arena.append_child(doc, html);
        let _ = arena.append_child(html, head);
        let _ = arena.append_child(html, body);
        arena
    }

    /// Add a node to the arena, returns its ID
    ///
    /// The node's `node_id` is rewritten to its arena index.
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        self.next_backend_id = self.next_backend_id.max(node.backend_node_id.saturating_add(1));
        self.backend_id_map.insert(node.backend_node_id, node_id);
        self.nodes.push(node);
        node_id
    }

    /// Create a detached element. Tag names are stored upper-case, as the
    /// DOM reports them for HTML documents.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let backend_id = self.next_backend_id;
        self.add_node(DomNode::new(
            0,
            backend_id,
            NodeType::Element,
            tag.to_ascii_uppercase(),
        ))
    }

    /// Create a detached element with attributes
    pub fn create_element_with(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create_element(tag);
        let node = &mut self.nodes[id as usize];
        for (name, value) in attrs {
            node.attributes.insert((*name).to_string(), (*value).to_string());
        }
        id
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let backend_id = self.next_backend_id;
        let mut node = DomNode::new(0, backend_id, NodeType::Text, "#text".into());
        node.node_value = text.to_string();
        self.add_node(node)
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node ID by backend node ID
    pub fn get_node_id_by_backend(&self, backend_id: u32) -> Option<NodeId> {
        self.backend_id_map.get(&backend_id).copied()
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        // Verify node exists
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// The `<html>` element: first element child of the document node, or
    /// the root itself when the tree was loaded without a document node.
    pub fn document_element(&self) -> Option<NodeId> {
        let root = self.get(self.root_id?).ok()?;
        if root.is_element() {
            return Some(root.node_id);
        }
        root.children_ids
            .iter()
            .copied()
            .find(|&id| self.get(id).map(|n| n.is_element()).unwrap_or(false))
    }

    /// The `<body>` element
    pub fn body(&self) -> Option<NodeId> {
        let html = self.get(self.document_element()?).ok()?;
        html.children_ids.iter().copied().find(|&id| {
            self.get(id)
                .map(|n| n.is_element() && n.node_name.eq_ignore_ascii_case("body"))
                .unwrap_or(false)
        })
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get element children of a node
    pub fn element_children(&self, node_id: NodeId) -> Result<SmallVec<[NodeId; 8]>> {
        let node = self.get(node_id)?;
        Ok(node
            .children_ids
            .iter()
            .copied()
            .filter(|&id| self.get(id).map(|c| c.is_element()).unwrap_or(false))
            .collect())
    }

    /// Get parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<&DomNode>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Traverse tree depth-first (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Attached element IDs in document (pre-order) order
    fn attached_elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(root) = self.root_id {
            let _ = self.traverse_df(root, |node| {
                if node.is_element() {
                    out.push(node.node_id);
                }
                Ok(())
            });
        }
        out
    }

    /// Find element by ID attribute (first in document order, attached only)
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.attached_elements()
            .into_iter()
            .find(|&node_id| self.nodes[node_id as usize].attr("id") == Some(id))
    }

    /// Find all attached elements carrying a class, in document order
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        self.attached_elements()
            .into_iter()
            .filter(|&node_id| self.nodes[node_id as usize].has_class(class))
            .collect()
    }

    // Tree mutation

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insertable(parent, child)?;
        self.detach(child)?;
        self.get_mut(parent)?.children_ids.push(child);
        self.get_mut(child)?.parent_id = Some(parent);
        Ok(())
    }

    /// Insert `child` into `parent` right before `reference`
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<()> {
        self.check_insertable(parent, child)?;
        if self.get(reference)?.parent_id != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        self.detach(child)?;
        let parent_node = self.get_mut(parent)?;
        let pos = parent_node
            .children_ids
            .iter()
            .position(|&id| id == reference)
            .ok_or(DomError::NotAChild {
                parent,
                child: reference,
            })?;
        parent_node.children_ids.insert(pos, child);
        self.get_mut(child)?.parent_id = Some(parent);
        Ok(())
    }

    /// Remove a node (and its subtree) from its parent
    ///
    /// The node stays in the arena; it just stops being part of the document.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        let Some(parent) = self.get(child)?.parent_id else {
            return Ok(());
        };
        self.get_mut(parent)?.children_ids.retain(|id| *id != child);
        self.get_mut(child)?.parent_id = None;
        Ok(())
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(child)?;
        if self.contains(child, parent) {
            return Err(DomError::Hierarchy(format!(
                "node {} is an ancestor of {}",
                child, parent
            )));
        }
        let parent_node = self.get(parent)?;
        if matches!(parent_node.node_type, NodeType::Text | NodeType::Comment) {
            return Err(DomError::InvalidNodeType {
                expected: "container node".to_string(),
                actual: format!("{:?}", parent_node.node_type),
            });
        }
        Ok(())
    }

    pub fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        self.get_mut(node_id)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Set a computed style property as reported by the host
    pub fn set_style(&mut self, node_id: NodeId, property: &str, value: &str) -> Result<()> {
        self.get_mut(node_id)?
            .computed_styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    /// Move keyboard focus. `None` blurs.
    pub fn focus(&mut self, node_id: Option<NodeId>) -> Result<()> {
        if let Some(id) = node_id {
            self.get(id)?;
        }
        self.active_id = node_id;
        Ok(())
    }

    /// Focused element; falls back to `<body>` when nothing (attached) has focus
    pub fn active_element(&self) -> Option<NodeId> {
        self.active_id
            .filter(|&id| self.is_attached(id))
            .or_else(|| self.body())
    }

    // Structural queries

    /// Inclusive containment: a node contains itself
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).ok().and_then(|n| n.parent_id);
        }
        false
    }

    /// Is the node reachable from the root?
    pub fn is_attached(&self, node_id: NodeId) -> bool {
        match self.root_id {
            Some(root) => self.contains(root, node_id),
            None => false,
        }
    }

    /// Top-most ancestor plus the child-index path leading down to the node
    fn index_path(&self, node_id: NodeId) -> (NodeId, SmallVec<[usize; 16]>) {
        let mut path = SmallVec::new();
        let mut current = node_id;
        while let Some(parent) = self.get(current).ok().and_then(|n| n.parent_id) {
            let pos = self
                .get(parent)
                .ok()
                .and_then(|p| p.children_ids.iter().position(|&id| id == current))
                .unwrap_or(0);
            path.push(pos);
            current = parent;
        }
        path.reverse();
        (current, path)
    }

    /// Document order of two nodes
    ///
    /// Ancestors precede their descendants (pre-order). Nodes in different
    /// (detached) trees are ordered by ID, which is arbitrary but stable.
    pub fn compare_document_position(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let (top_a, path_a) = self.index_path(a);
        let (top_b, path_b) = self.index_path(b);
        if top_a != top_b {
            return a.cmp(&b);
        }
        path_a.cmp(&path_b)
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.backend_id_map.clear();
        self.root_id = None;
        self.active_id = None;
        self.next_backend_id = 1;
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}
