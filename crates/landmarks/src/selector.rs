//! Path-based node identity
//!
//! A selector is built walking up from the element to (but not including)
//! `<html>`: `#id` ends the walk, otherwise each step is `tag` or
//! `tag.firstclass`, with `:nth-child(n)` appended when siblings repeat a
//! tag name. Steps are joined with `" > "`.
//!
//! ```text
//! body > div.page:nth-child(2) > nav
//! #sidebar > aside
//! ```

use crate::error::{LandmarkError, Result};
use crate::tree::TreeSource;
use ahash::AHashSet;

const SEPARATOR: &str = " > ";

/// Build the identity string for `node`
pub fn create_selector<T: TreeSource>(tree: &T, node: T::Node) -> String {
    let mut reverse_path: Vec<String> = Vec::new();
    let mut current = Some(node);

    while let Some(element) = current {
        let Some(tag) = tree.tag_name(element) else {
            break;
        };
        if tag.eq_ignore_ascii_case("html") {
            break;
        }

        if let Some(id) = tree.attribute(element, "id").filter(|id| !id.is_empty()) {
            reverse_path.push(format!("#{}", id));
            break;
        }

        let tag = tag.to_ascii_lowercase();
        let mut step = match first_class(tree, element) {
            Some(class) => format!("{}.{}", tag, class),
            None => tag,
        };

        if let Some(parent) = tree.parent_element(element) {
            let siblings = tree.element_children(parent);
            let mut seen = AHashSet::with_capacity(siblings.len());
            let repeats = siblings
                .iter()
                .filter_map(|&sibling| tree.tag_name(sibling))
                .any(|sibling_tag| !seen.insert(sibling_tag));
            if repeats {
                if let Some(pos) = siblings.iter().position(|&sibling| sibling == element) {
                    step.push_str(&format!(":nth-child({})", pos + 1));
                }
            }
        }

        reverse_path.push(step);
        current = tree.parent_element(element);
    }

    if reverse_path.is_empty() {
        return "html".to_string();
    }
    reverse_path.reverse();
    reverse_path.join(SEPARATOR)
}

/// Find the node a selector from [`create_selector`] points at
///
/// `Ok(None)` when the selector is well-formed but nothing in the current
/// tree matches it any more.
pub fn resolve_selector<T: TreeSource>(tree: &T, selector: &str) -> Result<Option<T::Node>> {
    let steps = selector
        .split(SEPARATOR)
        .map(|raw| Step::parse(raw.trim()).ok_or_else(|| invalid(selector)))
        .collect::<Result<Vec<_>>>()?;

    let Some(html) = tree.document_element() else {
        return Ok(None);
    };
    if let [Step::Html] = steps.as_slice() {
        return Ok(Some(html));
    }

    let mut current: Option<T::Node> = None;
    for (i, step) in steps.iter().enumerate() {
        current = match step {
            Step::Html => return Err(invalid(selector)),
            Step::Id(id) if i == 0 => tree.element_by_id(id),
            Step::Id(_) => return Err(invalid(selector)),
            Step::Element { .. } => {
                let parent = current.unwrap_or(html);
                step.find_child(tree, parent)
            }
        };
        if current.is_none() {
            return Ok(None);
        }
    }
    Ok(current)
}

fn invalid(selector: &str) -> LandmarkError {
    LandmarkError::InvalidSelector(selector.to_string())
}

fn first_class<T: TreeSource>(tree: &T, node: T::Node) -> Option<&str> {
    tree.attribute(node, "class")?.split_whitespace().next()
}

#[derive(Debug, PartialEq)]
enum Step<'a> {
    Html,
    Id(&'a str),
    Element {
        tag: &'a str,
        class: Option<&'a str>,
        nth: Option<usize>,
    },
}

impl<'a> Step<'a> {
    fn parse(raw: &'a str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        if raw == "html" {
            return Some(Step::Html);
        }
        if let Some(id) = raw.strip_prefix('#') {
            return (!id.is_empty()).then_some(Step::Id(id));
        }

        let (rest, nth) = match raw.split_once(":nth-child(") {
            Some((rest, tail)) => {
                let n: usize = tail.strip_suffix(')')?.parse().ok()?;
                if n == 0 {
                    return None;
                }
                (rest, Some(n))
            }
            None => (raw, None),
        };
        let (tag, class) = match rest.split_once('.') {
            Some((tag, class)) if !class.is_empty() => (tag, Some(class)),
            Some(_) => return None,
            None => (rest, None),
        };
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return None;
        }
        Some(Step::Element { tag, class, nth })
    }

    fn matches<T: TreeSource>(&self, tree: &T, node: T::Node) -> bool {
        let Step::Element { tag, class, .. } = self else {
            return false;
        };
        let tag_ok = tree
            .tag_name(node)
            .is_some_and(|actual| actual.eq_ignore_ascii_case(tag));
        let class_ok = match class {
            Some(class) => first_class(tree, node) == Some(*class),
            None => first_class(tree, node).is_none(),
        };
        tag_ok && class_ok
    }

    fn find_child<T: TreeSource>(&self, tree: &T, parent: T::Node) -> Option<T::Node> {
        let children = tree.element_children(parent);
        match self {
            Step::Element { nth: Some(n), .. } => children
                .get(n - 1)
                .copied()
                .filter(|&child| self.matches(tree, child)),
            _ => children.into_iter().find(|&child| self.matches(tree, child)),
        }
    }
}
