//! Landmark records and their serialisable views

use crate::role::LandmarkRole;
use serde::{Deserialize, Serialize};

/// Authoring problems spotted while scanning in diagnostics mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    /// Page has no main landmark
    LintNoMain,
    /// Page has more than one main landmark
    LintManyMains,
    /// Several unlabelled landmarks share this role
    LintDuplicateUnlabelled,
    /// More than one visible `<main>` element without an explicit role
    LintManyVisibleMainElements,
}

/// One discovered landmark
///
/// `node` is a handle into the host tree; the record does not keep the node
/// alive or attached.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkRecord<N> {
    /// Nesting among landmarks, not raw tree depth
    pub depth: usize,
    pub role: LandmarkRole,
    pub explicit_role: bool,
    pub role_description: Option<String>,
    pub label: Option<String>,
    pub guessed: bool,
    /// Path-based locator, see [`crate::selector`]
    pub selector: String,
    pub node: N,
    pub warnings: Vec<WarningKind>,
}

impl<N> LandmarkRecord<N> {
    /// The record without its node handle
    pub fn info(&self) -> LandmarkInfo {
        LandmarkInfo {
            depth: self.depth,
            role: self.role,
            explicit_role: self.explicit_role,
            role_description: self.role_description.clone(),
            label: self.label.clone(),
            guessed: self.guessed,
            selector: self.selector.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

/// What crosses a process boundary: everything except the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmarkInfo {
    pub depth: usize,
    pub role: LandmarkRole,
    pub explicit_role: bool,
    pub role_description: Option<String>,
    pub label: Option<String>,
    pub guessed: bool,
    pub selector: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<WarningKind>,
}

impl LandmarkInfo {
    /// `"Primary (Navigation)"`, `"Search"`, `"Navigation (guessed)"`
    pub fn display_name(&self) -> String {
        let role_name = self
            .role_description
            .clone()
            .unwrap_or_else(|| self.role.title());
        let name = match &self.label {
            Some(label) => format!("{} ({})", label, role_name),
            None => role_name,
        };
        if self.guessed {
            format!("{} (guessed)", name)
        } else {
            name
        }
    }
}
