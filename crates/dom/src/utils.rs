//! Utility functions for DOM processing

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{DomNode, NodeId, NodeType};

/// Is the element rendered at all? (`hidden` attribute or `display: none`)
fn is_rendered(node: &DomNode) -> bool {
    !node.has_attr("hidden") && node.style("display") != Some("none")
}

/// Get all text content from node and its children
pub fn get_text_content(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut text = String::new();

    arena.traverse_df(node_id, |node| {
        if node.node_type == NodeType::Text {
            text.push_str(&node.node_value);
        }
        Ok(())
    })?;

    Ok(text.trim().to_string())
}

/// Approximate `innerText`: text of rendered descendants with whitespace
/// collapsed. An element that is not rendered itself yields its raw text
/// content, as browsers do.
pub fn get_rendered_text(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let root = arena.get(node_id)?;
    if root.is_element() && !is_rendered(root) {
        return get_text_content(arena, node_id);
    }

    let mut raw = String::new();
    let mut stack = vec![node_id];
    while let Some(id) = stack.pop() {
        let node = arena.get(id)?;
        match node.node_type {
            NodeType::Text => {
                raw.push_str(&node.node_value);
                raw.push(' ');
            }
            NodeType::Element if id != node_id && !is_rendered(node) => continue,
            _ => stack.extend(node.children_ids.iter().rev().copied()),
        }
    }

    Ok(raw.split_whitespace().collect::<Vec<_>>().join(" "))
}
