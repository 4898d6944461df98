//! Plan data model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kinds of side-effecting actions a plan can carry.
///
/// Unrecognized kinds survive parsing and are ignored by the resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionKind {
    /// Fetch a page analysis and record it as design context, without
    /// writing a page file directly.
    #[serde(rename = "requestAnalysis")]
    RequestAnalysis,
    /// Fetch a page analysis and materialize it as a page file plus
    /// companion stylesheet at the action's destination path.
    #[serde(rename = "writeAnalyzed")]
    WriteAnalyzed,
    #[serde(other)]
    Unknown,
}

/// A single plan directive requiring resolution before files are final.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// URL to analyze
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Destination path for materialized output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Alternate destination field some model outputs use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Literal content fallback when no URL is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl PlanAction {
    pub fn request_analysis(url: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::RequestAnalysis,
            url: Some(url.into()),
            path: None,
            target: None,
            content: None,
        }
    }

    pub fn write_analyzed(url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::WriteAnalyzed,
            url: Some(url.into()),
            path: Some(path.into()),
            target: None,
            content: None,
        }
    }

    /// Destination path, falling back to the standard top-level page.
    pub fn destination(&self) -> &str {
        self.path
            .as_deref()
            .or(self.target.as_deref())
            .unwrap_or(crate::scaffold::DEFAULT_PAGE_PATH)
    }
}

/// Structured intent extracted from model output.
///
/// Constructed once by the parser, mutated during action resolution, then
/// consumed exactly once by the sandbox orchestrator. Only the resulting
/// file set is persisted, never the plan itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    /// Relative path to full text content; last write for a path wins
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    /// Paths to remove, processed before writes
    #[serde(default)]
    pub delete: Vec<String>,
    /// Package name to version constraint
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
    /// Auxiliary shell commands, informational only
    #[serde(default)]
    pub commands: Vec<String>,
    /// Directives resolved before the file set is committed
    #[serde(default)]
    pub actions: Vec<PlanAction>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
            && self.delete.is_empty()
            && self.dependencies.is_empty()
            && self.dev_dependencies.is_empty()
            && self.commands.is_empty()
            && self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_kinds_survive_parsing() {
        let action: PlanAction =
            serde_json::from_str(r#"{"type": "somethingNew", "url": "https://x.dev"}"#).unwrap();
        assert_eq!(action.kind, ActionKind::Unknown);
        assert_eq!(action.url.as_deref(), Some("https://x.dev"));
    }

    #[test]
    fn destination_prefers_path_then_target() {
        let mut action = PlanAction::write_analyzed("https://x.dev", "app/about/page.tsx");
        assert_eq!(action.destination(), "app/about/page.tsx");

        action.path = None;
        action.target = Some("app/other/page.tsx".to_string());
        assert_eq!(action.destination(), "app/other/page.tsx");

        action.target = None;
        assert_eq!(action.destination(), "app/page.tsx");
    }

    #[test]
    fn missing_containers_default_to_empty() {
        let plan: Plan = serde_json::from_str(r#"{"files": {"a.txt": "x"}}"#).unwrap();
        assert_eq!(plan.files.len(), 1);
        assert!(plan.delete.is_empty());
        assert!(plan.dependencies.is_empty());
        assert!(plan.dev_dependencies.is_empty());
        assert!(plan.commands.is_empty());
        assert!(plan.actions.is_empty());
    }
}
