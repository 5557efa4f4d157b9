//! Accessible label resolution
//!
//! Labels come from an ordered fallback chain. Each step is tagged with its
//! source, so callers (and tests) can tell which attribute won.

use crate::tree::TreeSource;
use serde::{Deserialize, Serialize};

/// Where a label came from, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelSource {
    LabelledBy,
    AriaLabel,
}

impl LabelSource {
    pub const CHAIN: [LabelSource; 2] = [LabelSource::LabelledBy, LabelSource::AriaLabel];

    fn extract<T: TreeSource>(&self, tree: &T, node: T::Node) -> Option<String> {
        match self {
            LabelSource::LabelledBy => {
                let id_refs = tree.attribute(node, "aria-labelledby")?;
                let texts: Vec<String> = id_refs
                    .split_whitespace()
                    .filter_map(|id| tree.element_by_id(id))
                    .map(|labeller| {
                        tree.rendered_text(labeller)
                            .unwrap_or_else(|| tree.text_content(labeller))
                    })
                    .collect();
                Some(texts.join(" "))
            }
            LabelSource::AriaLabel => tree.attribute(node, "aria-label").map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLabel {
    pub text: String,
    pub source: LabelSource,
}

/// First non-blank label in the chain
pub fn resolve_label<T: TreeSource>(tree: &T, node: T::Node) -> Option<ResolvedLabel> {
    LabelSource::CHAIN.iter().find_map(|source| {
        source
            .extract(tree, node)
            .filter(|text| !text.trim().is_empty())
            .map(|text| ResolvedLabel {
                text,
                source: *source,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{DomArena, NodeId};

    fn heading(arena: &mut DomArena, parent: NodeId, id: &str, text: &str) -> NodeId {
        let h = arena.create_element_with("h2", &[("id", id)]);
        let t = arena.create_text(text);
        arena.append_child(h, t).unwrap();
        arena.append_child(parent, h).unwrap();
        h
    }

    #[test]
    fn test_labelledby_wins_over_aria_label() {
        let mut arena = DomArena::new_document();
        let body = arena.body().unwrap();
        heading(&mut arena, body, "title", "Site  tools");
        let nav = arena.create_element_with(
            "nav",
            &[("aria-labelledby", "title"), ("aria-label", "Ignored")],
        );
        arena.append_child(body, nav).unwrap();

        let label = resolve_label(&arena, nav).unwrap();
        assert_eq!(label.text, "Site tools");
        assert_eq!(label.source, LabelSource::LabelledBy);
    }

    #[test]
    fn test_labelledby_joins_multiple_ids() {
        let mut arena = DomArena::new_document();
        let body = arena.body().unwrap();
        heading(&mut arena, body, "a", "First");
        heading(&mut arena, body, "b", "Second");
        let nav = arena.create_element_with("nav", &[("aria-labelledby", "a missing b")]);
        arena.append_child(body, nav).unwrap();

        assert_eq!(resolve_label(&arena, nav).unwrap().text, "First Second");
    }

    #[test]
    fn test_falls_back_to_aria_label() {
        let mut arena = DomArena::new_document();
        let body = arena.body().unwrap();
        let nav = arena.create_element_with(
            "nav",
            &[("aria-labelledby", "nowhere"), ("aria-label", "Primary")],
        );
        arena.append_child(body, nav).unwrap();

        let label = resolve_label(&arena, nav).unwrap();
        assert_eq!(label.text, "Primary");
        assert_eq!(label.source, LabelSource::AriaLabel);
    }

    #[test]
    fn test_no_label() {
        let mut arena = DomArena::new_document();
        let body = arena.body().unwrap();
        let nav = arena.create_element_with("nav", &[("aria-label", " ")]);
        arena.append_child(body, nav).unwrap();

        assert_eq!(resolve_label(&arena, nav), None);
    }
}
