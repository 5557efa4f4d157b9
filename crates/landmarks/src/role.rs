//! Role resolution for a single element
//!
//! Maps an element to its landmark role (implicit from the tag name, or
//! explicit from `role="..."`), decides whether it qualifies as a landmark,
//! and pulls out its label and role description.

use crate::error::LandmarkError;
use crate::label::{self, ResolvedLabel};
use crate::tree::TreeSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Navigable landmark roles: core ARIA plus the Digital Publishing module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LandmarkRole {
    Banner,
    Complementary,
    Contentinfo,
    Form,
    Main,
    Navigation,
    Region,
    Search,
    DocAcknowledgments,
    DocAfterword,
    DocAppendix,
    DocBibliography,
    DocChapter,
    DocConclusion,
    DocCredits,
    DocEndnotes,
    DocEpilogue,
    DocErrata,
    DocForeword,
    DocGlossary,
    DocIndex,
    DocIntroduction,
    DocPagelist,
    DocPart,
    DocPreface,
    DocPrologue,
    DocToc,
}

impl LandmarkRole {
    pub const ALL: [LandmarkRole; 27] = [
        LandmarkRole::Banner,
        LandmarkRole::Complementary,
        LandmarkRole::Contentinfo,
        LandmarkRole::Form,
        LandmarkRole::Main,
        LandmarkRole::Navigation,
        LandmarkRole::Region,
        LandmarkRole::Search,
        LandmarkRole::DocAcknowledgments,
        LandmarkRole::DocAfterword,
        LandmarkRole::DocAppendix,
        LandmarkRole::DocBibliography,
        LandmarkRole::DocChapter,
        LandmarkRole::DocConclusion,
        LandmarkRole::DocCredits,
        LandmarkRole::DocEndnotes,
        LandmarkRole::DocEpilogue,
        LandmarkRole::DocErrata,
        LandmarkRole::DocForeword,
        LandmarkRole::DocGlossary,
        LandmarkRole::DocIndex,
        LandmarkRole::DocIntroduction,
        LandmarkRole::DocPagelist,
        LandmarkRole::DocPart,
        LandmarkRole::DocPreface,
        LandmarkRole::DocPrologue,
        LandmarkRole::DocToc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LandmarkRole::Banner => "banner",
            LandmarkRole::Complementary => "complementary",
            LandmarkRole::Contentinfo => "contentinfo",
            LandmarkRole::Form => "form",
            LandmarkRole::Main => "main",
            LandmarkRole::Navigation => "navigation",
            LandmarkRole::Region => "region",
            LandmarkRole::Search => "search",
            LandmarkRole::DocAcknowledgments => "doc-acknowledgments",
            LandmarkRole::DocAfterword => "doc-afterword",
            LandmarkRole::DocAppendix => "doc-appendix",
            LandmarkRole::DocBibliography => "doc-bibliography",
            LandmarkRole::DocChapter => "doc-chapter",
            LandmarkRole::DocConclusion => "doc-conclusion",
            LandmarkRole::DocCredits => "doc-credits",
            LandmarkRole::DocEndnotes => "doc-endnotes",
            LandmarkRole::DocEpilogue => "doc-epilogue",
            LandmarkRole::DocErrata => "doc-errata",
            LandmarkRole::DocForeword => "doc-foreword",
            LandmarkRole::DocGlossary => "doc-glossary",
            LandmarkRole::DocIndex => "doc-index",
            LandmarkRole::DocIntroduction => "doc-introduction",
            LandmarkRole::DocPagelist => "doc-pagelist",
            LandmarkRole::DocPart => "doc-part",
            LandmarkRole::DocPreface => "doc-preface",
            LandmarkRole::DocPrologue => "doc-prologue",
            LandmarkRole::DocToc => "doc-toc",
        }
    }

    /// Human-readable name: "Navigation", "Toc" for `doc-toc`
    pub fn title(&self) -> String {
        let base = self.as_str();
        let base = base.strip_prefix("doc-").unwrap_or(base);
        let mut chars = base.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }

    /// `region` and implicit `form` only count when labelled
    fn needs_label(&self, explicit: bool) -> bool {
        match self {
            LandmarkRole::Region => true,
            LandmarkRole::Form => !explicit,
            _ => false,
        }
    }
}

impl fmt::Display for LandmarkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkRole {
    type Err = LandmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LandmarkRole::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| LandmarkError::UnknownRole(s.to_string()))
    }
}

/// Ancestors that stop `<header>`/`<footer>` being page-level: sectioning
/// content, non-body sectioning roots, and `<main>`
const SECTIONING_AND_MAIN: &[&str] = &[
    "ARTICLE",
    "ASIDE",
    "NAV",
    "SECTION",
    "BLOCKQUOTE",
    "DETAILS",
    "FIELDSET",
    "FIGURE",
    "TD",
    "MAIN",
];

/// Role implied by the tag name alone
pub fn implicit_role(tag: &str) -> Option<LandmarkRole> {
    match tag.to_ascii_uppercase().as_str() {
        "ASIDE" => Some(LandmarkRole::Complementary),
        "FOOTER" => Some(LandmarkRole::Contentinfo),
        "FORM" => Some(LandmarkRole::Form),
        "HEADER" => Some(LandmarkRole::Banner),
        "MAIN" => Some(LandmarkRole::Main),
        "NAV" => Some(LandmarkRole::Navigation),
        "SECTION" => Some(LandmarkRole::Region),
        _ => None,
    }
}

/// Outcome of looking at one element
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Hidden: the element and its subtree are ignored
    Hidden,
    /// Visible, but not a landmark; children may still be
    NotLandmark,
    Landmark(ResolvedRole),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRole {
    pub role: LandmarkRole,
    pub explicit: bool,
    pub label: Option<ResolvedLabel>,
    pub role_description: Option<String>,
}

/// Classify one element
pub fn resolve<T: TreeSource>(tree: &T, node: T::Node) -> Resolution {
    let Some(tag) = tree.tag_name(node) else {
        return Resolution::NotLandmark;
    };

    if is_visually_hidden(tree, node) || is_semantically_hidden(tree, node) {
        return Resolution::Hidden;
    }

    let mut role = implicit_role(tag).map(|role| (role, false));
    if matches!(role, Some((LandmarkRole::Banner | LandmarkRole::Contentinfo, _)))
        && !is_top_level(tree, node)
    {
        role = None;
    }

    if let Some(explicit) = tree.attribute(node, "role").map(str::trim) {
        if !explicit.is_empty() {
            // An unknown explicit role still overrides the implicit one
            role = explicit.parse().ok().map(|role| (role, true));
            if role.is_none() {
                return Resolution::NotLandmark;
            }
        }
    }

    let Some((role, explicit)) = role else {
        return Resolution::NotLandmark;
    };

    let label = label::resolve_label(tree, node);
    if role.needs_label(explicit) && label.is_none() {
        return Resolution::NotLandmark;
    }

    Resolution::Landmark(ResolvedRole {
        role,
        explicit,
        label,
        role_description: role_description(tree, node),
    })
}

/// `hidden` attribute, `visibility: hidden` or `display: none` on the element
/// itself. Hidden ancestors are not consulted.
pub fn is_visually_hidden<T: TreeSource>(tree: &T, node: T::Node) -> bool {
    tree.has_attribute(node, "hidden")
        || tree.computed_style(node, "visibility") == Some("hidden")
        || tree.computed_style(node, "display") == Some("none")
}

/// `aria-hidden="true"`, or `inert` unless it is explicitly `"false"`
pub fn is_semantically_hidden<T: TreeSource>(tree: &T, node: T::Node) -> bool {
    tree.attribute(node, "aria-hidden") == Some("true")
        || tree
            .attribute(node, "inert")
            .is_some_and(|value| value != "false")
}

/// Whitespace-only descriptions count as absent
pub fn role_description<T: TreeSource>(tree: &T, node: T::Node) -> Option<String> {
    tree.attribute(node, "aria-roledescription")
        .filter(|desc| !desc.trim().is_empty())
        .map(str::to_string)
}

fn is_top_level<T: TreeSource>(tree: &T, node: T::Node) -> bool {
    let mut ancestor = tree.parent_element(node);
    while let Some(current) = ancestor {
        let sectioning = tree
            .tag_name(current)
            .is_some_and(|tag| SECTIONING_AND_MAIN.iter().any(|s| s.eq_ignore_ascii_case(tag)));
        if sectioning {
            return false;
        }
        ancestor = tree.parent_element(current);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{DomArena, NodeId};

    fn attach(arena: &mut DomArena, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = arena.create_element_with(tag, attrs);
        arena.append_child(parent, id).unwrap();
        id
    }

    fn role_of(arena: &DomArena, node: NodeId) -> Option<(LandmarkRole, bool)> {
        match resolve(arena, node) {
            Resolution::Landmark(resolved) => Some((resolved.role, resolved.explicit)),
            _ => None,
        }
    }

    #[test]
    fn test_role_names_match_serde_names() {
        for role in LandmarkRole::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            assert_eq!(role.as_str().parse::<LandmarkRole>().unwrap(), role);
        }
        assert!("button".parse::<LandmarkRole>().is_err());
    }

    #[test]
    fn test_titles() {
        assert_eq!(LandmarkRole::Navigation.title(), "Navigation");
        assert_eq!(LandmarkRole::DocToc.title(), "Toc");
        assert_eq!(LandmarkRole::Contentinfo.title(), "Contentinfo");
    }

    #[test]
    fn test_implicit_roles() {
        let mut arena = DomArena::new_document();
        let body = arena.body().unwrap();
        let nav = attach(&mut arena, body, "nav", &[]);
        let aside = attach(&mut arena, body, "aside", &[]);
        let main = attach(&mut arena, body, "main", &[]);
        let div = attach(&mut arena, body, "div", &[]);

        assert_eq!(role_of(&arena, nav), Some((LandmarkRole::Navigation, false)));
        assert_eq!(role_of(&arena, aside), Some((LandmarkRole::Complementary, false)));
        assert_eq!(role_of(&arena, main), Some((LandmarkRole::Main, false)));
        assert_eq!(role_of(&arena, div), None);
    }

    #[test]
    fn test_header_footer_only_count_at_top_level() {
        let mut arena = DomArena::new_document();
        let body = arena.body().unwrap();
        let header = attach(&mut arena, body, "header", &[]);
        let article = attach(&mut arena, body, "article", &[]);
        let nested_footer = attach(&mut arena, article, "footer", &[]);
        let wrapper = attach(&mut arena, body, "div", &[]);
        let footer = attach(&mut arena, wrapper, "footer", &[]);
        let cell = attach(&mut arena, body, "td", &[]);
        let explicit = attach(&mut arena, cell, "header", &[("role", "banner")]);
        let main = attach(&mut arena, body, "main", &[]);
        let main_header = attach(&mut arena, main, "header", &[]);
        let inside_main = attach(&mut arena, main, "div", &[]);
        let deep_footer = attach(&mut arena, inside_main, "footer", &[]);

        assert_eq!(role_of(&arena, header), Some((LandmarkRole::Banner, false)));
        assert_eq!(role_of(&arena, nested_footer), None);
        assert_eq!(role_of(&arena, main_header), None);
        assert_eq!(role_of(&arena, deep_footer), None);
        assert_eq!(role_of(&arena, footer), Some((LandmarkRole::Contentinfo, false)));
        assert_eq!(role_of(&arena, explicit), Some((LandmarkRole::Banner, true)));
    }

    #[test]
    fn test_explicit_role_overrides_tag() {
        let mut arena = DomArena::new_document();
        let body = arena.body().unwrap();
        let search = attach(&mut arena, body, "div", &[("role", "search")]);
        let not_nav = attach(&mut arena, body, "nav", &[("role", "button")]);
        let blank = attach(&mut arena, body, "nav", &[("role", "  ")]);

        assert_eq!(role_of(&arena, search), Some((LandmarkRole::Search, true)));
        assert_eq!(role_of(&arena, not_nav), None);
        assert_eq!(role_of(&arena, blank), Some((LandmarkRole::Navigation, false)));
    }

    #[test]
    fn test_region_and_form_label_requirements() {
        let mut arena = DomArena::new_document();
        let body = arena.body().unwrap();
        let section = attach(&mut arena, body, "section", &[]);
        let labelled = attach(&mut arena, body, "section", &[("aria-label", "News")]);
        let form = attach(&mut arena, body, "form", &[]);
        let div_form = attach(&mut arena, body, "div", &[("role", "form")]);
        let empty_label = attach(&mut arena, body, "section", &[("aria-label", "   ")]);

        assert_eq!(role_of(&arena, section), None);
        assert_eq!(role_of(&arena, labelled), Some((LandmarkRole::Region, false)));
        assert_eq!(role_of(&arena, form), None);
        assert_eq!(role_of(&arena, div_form), Some((LandmarkRole::Form, true)));
        assert_eq!(role_of(&arena, empty_label), None);
    }

    #[test]
    fn test_hidden_elements() {
        let mut arena = DomArena::new_document();
        let body = arena.body().unwrap();
        let hidden = attach(&mut arena, body, "nav", &[("hidden", "")]);
        let aria_hidden = attach(&mut arena, body, "nav", &[("aria-hidden", "true")]);
        let aria_shown = attach(&mut arena, body, "nav", &[("aria-hidden", "false")]);
        let inert = attach(&mut arena, body, "nav", &[("inert", "")]);
        let not_inert = attach(&mut arena, body, "nav", &[("inert", "false")]);
        let invisible = attach(&mut arena, body, "nav", &[]);
        arena.set_style(invisible, "visibility", "hidden").unwrap();

        assert_eq!(resolve(&arena, hidden), Resolution::Hidden);
        assert_eq!(resolve(&arena, aria_hidden), Resolution::Hidden);
        assert_eq!(resolve(&arena, inert), Resolution::Hidden);
        assert_eq!(resolve(&arena, invisible), Resolution::Hidden);
        assert!(role_of(&arena, aria_shown).is_some());
        assert!(role_of(&arena, not_inert).is_some());
    }

    #[test]
    fn test_role_description() {
        let mut arena = DomArena::new_document();
        let body = arena.body().unwrap();
        let custom = attach(&mut arena, body, "nav", &[("aria-roledescription", "Menu bar")]);
        let blank = attach(&mut arena, body, "nav", &[("aria-roledescription", " \t")]);

        assert_eq!(role_description(&arena, custom).as_deref(), Some("Menu bar"));
        assert_eq!(role_description(&arena, blank), None);
    }
}
