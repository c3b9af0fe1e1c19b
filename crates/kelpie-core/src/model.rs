use serde::{Deserialize, Serialize};

/// Visual category of a node.
///
/// `Qna` nodes carry a question as `title` and the answer as `description`;
/// `Blank` nodes are user-inserted empty cards (and synthesized placeholders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    #[default]
    Regular,
    Qna,
    Blank,
}

/// A single node of the diagram forest.
///
/// Invariants maintained by [`crate::Document`]:
/// - `level == 0` iff `parent_id == None`, otherwise `level == parent.level + 1`;
/// - `has_children` reflects whether any live node names this one as parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub title: String,
    pub description: String,
    pub parent_id: Option<String>,
    pub level: u32,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_ref: Option<u32>,
    #[serde(default)]
    pub has_children: bool,
    /// Hides the entire subtree below this node when set.
    #[serde(default)]
    pub children_collapsed: bool,
    /// Synthesized stand-in for a dangling parent reference.
    #[serde(default)]
    pub placeholder: bool,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Derived parent→child connection. One edge exists per non-root node; edges
/// are rewired when a delete reparents the children of the deleted node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
}

impl Edge {
    pub fn between(source_id: &str, target_id: &str) -> Self {
        Self {
            id: format!("e-{source_id}-{target_id}"),
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
        }
    }
}

/// Wire shape produced by the upstream document-to-tree generation service.
///
/// This mirrors the service's JSON payload (camelCase keys); fields the service
/// may omit default to empty values so a partially filled record still ingests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_ref: Option<u32>,
}

/// Field merge applied by `update_content`. `None` fields are left untouched;
/// structure (position, level, parent) is never affected by a patch.
#[derive(Debug, Clone, Default)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<NodeKind>,
    pub page_ref: Option<u32>,
}

impl ContentPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }
}
