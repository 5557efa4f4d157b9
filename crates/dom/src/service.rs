//! DOM Service - loads CDP responses into a [`DomArena`]
//!
//! Two inputs are understood:
//! - `DOM.getDocument` (with `depth: -1`) builds the whole tree
//! - `CSS.getComputedStyleForNode` adds the styles that decide visibility

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::*;
use serde::Deserialize;
use serde_json::Value;

/// Computed style properties worth keeping
pub const TRACKED_STYLE_PROPERTIES: &[&str] = &["display", "visibility"];

#[derive(Deserialize)]
struct GetDocumentResponse {
    root: CdpNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdpNode {
    backend_node_id: u32,
    node_type: u8,
    #[serde(default)]
    node_name: String,
    #[serde(default)]
    node_value: String,
    /// Flat `[name, value, name, value, ...]` list
    #[serde(default)]
    attributes: Vec<String>,
    #[serde(default)]
    children: Vec<CdpNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComputedStyleResponse {
    computed_style: Vec<CssProperty>,
}

#[derive(Deserialize)]
struct CssProperty {
    name: String,
    value: String,
}

#[derive(Default)]
pub struct DomService {
    arena: DomArena,
}

impl DomService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut DomArena {
        &mut self.arena
    }

    /// Hand the arena over to whoever monitors the document
    pub fn into_arena(self) -> DomArena {
        self.arena
    }

    /// Replace the arena with the tree from a `DOM.getDocument` response
    ///
    /// ```json
    /// { "root": { "backendNodeId": 1, "nodeType": 9, "nodeName": "#document", "children": [...] } }
    /// ```
    pub fn parse_cdp_dom_tree(&mut self, cdp_response: &Value) -> Result<NodeId> {
        let response = GetDocumentResponse::deserialize(cdp_response)?;

        self.arena.clear();
        let root_id = self.insert(response.root)?;
        self.arena.set_root(root_id)?;
        tracing::debug!("[DomService] Loaded {} nodes", self.arena.len());

        Ok(root_id)
    }

    /// Pre-order insert with an explicit stack, so ids follow document order
    fn insert(&mut self, root: CdpNode) -> Result<NodeId> {
        let mut root_id = None;
        let mut stack = vec![(root, None)];

        while let Some((cdp_node, parent_id)) = stack.pop() {
            let node_type = NodeType::try_from(cdp_node.node_type)?;

            let mut node = DomNode::new(0, cdp_node.backend_node_id, node_type, cdp_node.node_name);
            node.node_value = cdp_node.node_value;
            node.parent_id = parent_id;
            let mut attributes = cdp_node.attributes.into_iter();
            while let (Some(name), Some(value)) = (attributes.next(), attributes.next()) {
                node.attributes.insert(name, value);
            }

            let node_id = self.arena.add_node(node);
            match parent_id {
                Some(parent) => self.arena.get_mut(parent)?.children_ids.push(node_id),
                None => root_id = Some(node_id),
            }
            stack.extend(
                cdp_node
                    .children
                    .into_iter()
                    .rev()
                    .map(|child| (child, Some(node_id))),
            );
        }

        root_id.ok_or(DomError::NodeNotFound(0))
    }

    /// Merge a `CSS.getComputedStyleForNode` response into a node
    ///
    /// ```json
    /// { "computedStyle": [ { "name": "display", "value": "none" }, ... ] }
    /// ```
    pub fn merge_computed_style(&mut self, backend_node_id: u32, response: &Value) -> Result<()> {
        let response = ComputedStyleResponse::deserialize(response)?;

        let node_id = self
            .arena
            .get_node_id_by_backend(backend_node_id)
            .ok_or(DomError::NodeNotFound(backend_node_id))?;
        let node = self.arena.get_mut(node_id)?;

        node.computed_styles.extend(
            response
                .computed_style
                .into_iter()
                .filter(|property| TRACKED_STYLE_PROPERTIES.contains(&property.name.as_str()))
                .map(|property| (property.name, property.value)),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(service: &DomService, backend_id: u32) -> &DomNode {
        let node_id = service.arena().get_node_id_by_backend(backend_id).unwrap();
        service.arena().get(node_id).unwrap()
    }

    fn sample_tree() -> Value {
        serde_json::json!({
            "root": {
                "nodeId": 1,
                "backendNodeId": 1,
                "nodeType": 9,
                "nodeName": "#document",
                "nodeValue": "",
                "children": [{
                    "nodeId": 2,
                    "backendNodeId": 2,
                    "nodeType": 1,
                    "nodeName": "HTML",
                    "attributes": [],
                    "children": [{
                        "nodeId": 3,
                        "backendNodeId": 3,
                        "nodeType": 1,
                        "nodeName": "BODY",
                        "children": [{
                            "nodeId": 4,
                            "backendNodeId": 7,
                            "nodeType": 1,
                            "nodeName": "NAV",
                            "attributes": ["aria-label", "Primary", "class", "menu"]
                        }]
                    }]
                }]
            }
        })
    }

    #[test]
    fn test_parse_simple_dom() {
        let mut service = DomService::new();
        let root_id = service.parse_cdp_dom_tree(&sample_tree()).unwrap();

        assert_eq!(root_id, 0);
        assert_eq!(service.arena().len(), 4);

        let nav = node(&service, 7);
        assert_eq!(nav.attr("aria-label"), Some("Primary"));
        assert!(nav.has_class("menu"));
        assert_eq!(service.arena().body(), Some(2));
    }

    #[test]
    fn test_merge_computed_style() {
        let mut service = DomService::new();
        service.parse_cdp_dom_tree(&sample_tree()).unwrap();

        let style = serde_json::json!({
            "computedStyle": [
                { "name": "display", "value": "none" },
                { "name": "color", "value": "red" }
            ]
        });
        service.merge_computed_style(7, &style).unwrap();

        let nav = node(&service, 7);
        assert_eq!(nav.style("display"), Some("none"));
        assert_eq!(nav.style("color"), None);

        assert!(matches!(
            service.merge_computed_style(99, &style),
            Err(DomError::NodeNotFound(99))
        ));
    }

    #[test]
    fn test_deep_tree_keeps_document_order() {
        let mut leaf = serde_json::json!({ "backendNodeId": 1000, "nodeType": 3, "nodeName": "#text", "nodeValue": "deep" });
        for depth in (10..110).rev() {
            leaf = serde_json::json!({
                "backendNodeId": depth,
                "nodeType": 1,
                "nodeName": "DIV",
                "children": [leaf, { "backendNodeId": depth + 2000, "nodeType": 1, "nodeName": "SPAN" }]
            });
        }
        let tree = serde_json::json!({
            "root": { "backendNodeId": 1, "nodeType": 9, "nodeName": "#document", "children": [leaf] }
        });

        let mut service = DomService::new();
        service.parse_cdp_dom_tree(&tree).unwrap();
        let arena = service.arena();
        assert_eq!(arena.len(), 202);

        let outer = arena.get_node_id_by_backend(10).unwrap();
        let inner = arena.get_node_id_by_backend(11).unwrap();
        let span = arena.get_node_id_by_backend(2010).unwrap();
        assert_eq!(arena.get(outer).unwrap().children_ids.as_slice(), &[inner, span]);
        assert_eq!(arena.get(inner).unwrap().parent_id, Some(outer));
        assert_eq!(arena.compare_document_position(inner, span), std::cmp::Ordering::Less);
    }

    #[test]
    fn test_malformed_responses() {
        let mut service = DomService::new();
        let result = service.parse_cdp_dom_tree(&serde_json::json!({}));
        assert!(matches!(result, Err(DomError::ParseError(_))));

        let bad_type = serde_json::json!({
            "root": { "backendNodeId": 1, "nodeType": 42, "nodeName": "?" }
        });
        assert!(matches!(
            service.parse_cdp_dom_tree(&bad_type),
            Err(DomError::UnknownNodeType(42))
        ));
    }
}
