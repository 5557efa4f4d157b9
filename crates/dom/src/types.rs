//! Node types stored in the arena
//!
//! Nodes refer to each other by [`NodeId`] (a u32 index into the arena),
//! never by pointer, so detached nodes keep a valid handle.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::error::DomError;

/// Index into a [`crate::DomArena`]
pub type NodeId = u32;

/// DOM `nodeType` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

impl TryFrom<u8> for NodeType {
    type Error = DomError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use NodeType::*;
        let node_type = match value {
            1 => Element,
            2 => Attribute,
            3 => Text,
            4 => CdataSection,
            5 => EntityReference,
            6 => Entity,
            7 => ProcessingInstruction,
            8 => Comment,
            9 => Document,
            10 => DocumentType,
            11 => DocumentFragment,
            12 => Notation,
            other => return Err(DomError::UnknownNodeType(other)),
        };
        Ok(node_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    /// CDP `backendNodeId`, stable across `DOM.getDocument` calls
    pub backend_node_id: u32,
    pub node_type: NodeType,

    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>,

    /// Upper-case tag for elements (`NAV`), `#text` etc. otherwise
    pub node_name: String,
    pub node_value: String,
    pub attributes: HashMap<String, String>,
    /// Only the properties the host chose to report
    pub computed_styles: HashMap<String, String>,
}

impl DomNode {
    pub fn new(node_id: NodeId, backend_node_id: u32, node_type: NodeType, node_name: String) -> Self {
        Self {
            node_id,
            backend_node_id,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name,
            node_value: String::new(),
            attributes: HashMap::new(),
            computed_styles: HashMap::new(),
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// `None` unless this is an element
    pub fn tag_name(&self) -> Option<&str> {
        self.is_element().then_some(self.node_name.as_str())
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Presence check, for boolean attributes like `hidden`
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.computed_styles.get(property).map(String::as_str)
    }

    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list().any(|c| c == class)
    }
}
