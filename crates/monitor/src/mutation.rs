//! Change notifications from the host document
//!
//! The host batches DOM mutations the way a `MutationObserver` does. Only some
//! of them can change which landmarks exist: see [`should_trigger_rescan`].

use dom::NodeType;
use serde::{Deserialize, Serialize};

/// Attributes whose changes can affect landmark discovery
pub const OBSERVED_ATTRIBUTES: &[&str] = &[
    "class",
    "style",
    "hidden",
    "role",
    "aria-labelledby",
    "aria-label",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    /// `value` is the attribute's value after the change
    Attribute { name: String, value: Option<String> },
    ChildList {
        #[serde(default)]
        added: Vec<NodeType>,
        #[serde(default)]
        removed: Vec<NodeType>,
    },
}

impl Mutation {
    pub fn attribute(name: &str, value: Option<&str>) -> Self {
        Mutation::Attribute {
            name: name.to_string(),
            value: value.map(str::to_string),
        }
    }

    pub fn child_list(added: &[NodeType], removed: &[NodeType]) -> Self {
        Mutation::ChildList {
            added: added.to_vec(),
            removed: removed.to_vec(),
        }
    }
}

/// Could this batch change the landmark list?
///
/// - `style` changes only when the new value mentions `display` or
///   `visibility`
/// - any other observed attribute always
/// - structural changes when an element was added or removed
pub fn should_trigger_rescan(batch: &[Mutation]) -> bool {
    batch.iter().any(|mutation| match mutation {
        Mutation::Attribute { name, value } if name == "style" => value
            .as_deref()
            .is_some_and(|style| style.contains("display") || style.contains("visibility")),
        Mutation::Attribute { name, .. } => OBSERVED_ATTRIBUTES.contains(&name.as_str()),
        Mutation::ChildList { added, removed } => added
            .iter()
            .chain(removed)
            .any(|node_type| *node_type == NodeType::Element),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_needs_visibility_keywords() {
        assert!(!should_trigger_rescan(&[Mutation::attribute(
            "style",
            Some("color: red")
        )]));
        assert!(!should_trigger_rescan(&[Mutation::attribute("style", None)]));
        assert!(should_trigger_rescan(&[Mutation::attribute(
            "style",
            Some("display: none")
        )]));
        assert!(should_trigger_rescan(&[
            Mutation::attribute("style", Some("margin: 0")),
            Mutation::attribute("style", Some("visibility: hidden")),
        ]));
    }

    #[test]
    fn test_watched_attributes() {
        for name in ["class", "hidden", "role", "aria-labelledby", "aria-label"] {
            assert!(should_trigger_rescan(&[Mutation::attribute(name, None)]), "{name}");
        }
        assert!(!should_trigger_rescan(&[Mutation::attribute("title", Some("x"))]));
    }

    #[test]
    fn test_structural_changes() {
        assert!(!should_trigger_rescan(&[Mutation::child_list(
            &[NodeType::Text, NodeType::Comment],
            &[]
        )]));
        assert!(should_trigger_rescan(&[Mutation::child_list(
            &[NodeType::Text],
            &[NodeType::Element]
        )]));
        assert!(!should_trigger_rescan(&[]));
    }

    #[test]
    fn test_batch_from_json() {
        let batch: Vec<Mutation> = serde_json::from_value(serde_json::json!([
            { "type": "attribute", "name": "style", "value": "color: blue" },
            { "type": "childList", "added": ["Element"] }
        ]))
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert!(should_trigger_rescan(&batch));
    }
}
