use std::collections::VecDeque;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{ContentPatch, Edge, Node, NodeKind, NodeRecord};

/// The mutable node forest.
///
/// Nodes are kept in creation order (`IndexMap`) so that every derived
/// iteration (roots, children, edges, layout input) is deterministic. A
/// separate parent→children index is maintained across mutations so subtree
/// walks do not rescan the table.
///
/// All mutations keep the forest invariant: `level == 0` iff the node has no
/// parent, and otherwise `level == parent.level + 1`. Malformed references
/// degrade via placeholder synthesis instead of erroring.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: IndexMap<String, Node>,
    children: FxHashMap<String, Vec<String>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests the generation service's initial batch.
    ///
    /// Records are taken in order; duplicate ids are skipped, dangling parent
    /// references are patched with placeholder nodes, and levels are
    /// recomputed from the roots so inconsistent input cannot break the
    /// forest invariant. Empty input yields an empty document.
    pub fn from_records(records: Vec<NodeRecord>) -> Self {
        let mut doc = Self::default();
        for rec in records {
            if doc.nodes.contains_key(&rec.id) {
                warn!(id = %rec.id, "skipping duplicate node id in generation payload");
                continue;
            }
            let node = Node {
                id: rec.id.clone(),
                title: rec.title,
                description: rec.description,
                parent_id: rec.parent_id,
                level: rec.level,
                kind: rec.kind,
                page_ref: rec.page_ref,
                has_children: false,
                children_collapsed: false,
                placeholder: false,
            };
            doc.nodes.insert(rec.id, node);
        }
        doc.synthesize_missing_parents();
        doc.rebuild_children();
        doc.normalize_levels();
        doc.refresh_has_children();
        doc
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_root())
    }

    pub fn child_ids(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children(&self, id: &str) -> impl Iterator<Item = &Node> {
        self.child_ids(id).iter().filter_map(|c| self.nodes.get(c))
    }

    /// Ids of every node strictly below `id`, breadth-first.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut queue: VecDeque<&String> = self.child_ids(id).iter().collect();
        while let Some(cur) = queue.pop_front() {
            out.push(cur.clone());
            if let Some(kids) = self.children.get(cur) {
                queue.extend(kids.iter());
            }
        }
        out
    }

    /// `id` plus all of its descendants.
    pub fn subtree(&self, id: &str) -> Vec<String> {
        let mut out = vec![id.to_string()];
        out.extend(self.descendants(id));
        out
    }

    /// True when any node on `id`'s ancestor path has `children_collapsed`
    /// set. The walk is bounded by the node count so a malformed parent
    /// chain cannot loop.
    pub fn has_collapsed_ancestor(&self, id: &str) -> bool {
        let mut cur = self.nodes.get(id).and_then(|n| n.parent_id.as_deref());
        let mut hops = 0usize;
        while let Some(pid) = cur {
            let Some(parent) = self.nodes.get(pid) else {
                return false;
            };
            if parent.children_collapsed {
                return true;
            }
            hops += 1;
            if hops > self.nodes.len() {
                return false;
            }
            cur = parent.parent_id.as_deref();
        }
        false
    }

    pub fn max_level(&self) -> u32 {
        self.nodes.values().map(|n| n.level).max().unwrap_or(0)
    }

    /// Derived edge list: exactly one parent→child edge per non-root node,
    /// in node creation order. Regenerating on demand keeps edges rewired
    /// for free across delete-with-reparent.
    pub fn edges(&self) -> Vec<Edge> {
        self.nodes
            .values()
            .filter_map(|n| {
                n.parent_id
                    .as_deref()
                    .map(|pid| Edge::between(pid, &n.id))
            })
            .collect()
    }

    /// Creates a node one level below `parent_id` and returns its id.
    ///
    /// An unknown parent id is patched with a placeholder root first so the
    /// forest stays internally consistent. The only error is a caller
    /// supplying an explicit id that is already taken.
    pub fn add_child(
        &mut self,
        parent_id: &str,
        title: &str,
        description: &str,
        explicit_id: Option<String>,
    ) -> Result<String> {
        if let Some(id) = &explicit_id {
            if self.nodes.contains_key(id) {
                return Err(Error::DuplicateNodeId { id: id.clone() });
            }
        }
        if !self.nodes.contains_key(parent_id) {
            self.synthesize_placeholder(parent_id, 0);
        }

        let parent_level = self.nodes.get(parent_id).map(|p| p.level).unwrap_or(0);
        let id = explicit_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let node = Node {
            id: id.clone(),
            title: title.to_string(),
            description: description.to_string(),
            parent_id: Some(parent_id.to_string()),
            level: parent_level + 1,
            kind: NodeKind::Regular,
            page_ref: None,
            has_children: false,
            children_collapsed: false,
            placeholder: false,
        };
        self.nodes.insert(id.clone(), node);
        self.children
            .entry(parent_id.to_string())
            .or_default()
            .push(id.clone());
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.has_children = true;
        }
        Ok(id)
    }

    /// Pure field merge; unknown ids are a no-op. Structure (parent, level)
    /// and position are never touched by a patch.
    pub fn update_content(&mut self, id: &str, patch: ContentPatch) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if let Some(title) = patch.title {
            node.title = title;
        }
        if let Some(description) = patch.description {
            node.description = description;
        }
        if let Some(kind) = patch.kind {
            node.kind = kind;
        }
        if let Some(page_ref) = patch.page_ref {
            node.page_ref = Some(page_ref);
        }
    }

    /// Removes `id`, reparenting its children (and shifting their subtrees
    /// one level up) to the deleted node's former parent. Children are never
    /// deleted transitively. Unknown ids, including a double delete, leave
    /// all state unchanged.
    pub fn delete_node(&mut self, id: &str) -> Option<Node> {
        let node = self.nodes.shift_remove(id)?;
        let child_ids = self.children.remove(id).unwrap_or_default();
        let grandparent = node.parent_id.clone();

        if let Some(pid) = &grandparent {
            if let Some(list) = self.children.get_mut(pid) {
                list.retain(|c| c != id);
            }
        }

        for cid in &child_ids {
            for sid in self.subtree(cid) {
                if let Some(n) = self.nodes.get_mut(&sid) {
                    n.level = n.level.saturating_sub(1);
                }
            }
            if let Some(child) = self.nodes.get_mut(cid) {
                child.parent_id = grandparent.clone();
            }
        }
        if let Some(pid) = &grandparent {
            self.children
                .entry(pid.clone())
                .or_default()
                .extend(child_ids.iter().cloned());
        }

        if let Some(pid) = &grandparent {
            let has = self.children.get(pid).is_some_and(|c| !c.is_empty());
            if let Some(parent) = self.nodes.get_mut(pid) {
                parent.has_children = has;
            }
        }
        Some(node)
    }

    /// Sets the collapse flag on `id`. Returns the new flag value, or `None`
    /// for an unknown id.
    pub fn set_children_collapsed(&mut self, id: &str, collapsed: bool) -> Option<bool> {
        let node = self.nodes.get_mut(id)?;
        node.children_collapsed = collapsed;
        Some(collapsed)
    }

    fn synthesize_missing_parents(&mut self) {
        let mut missing: IndexMap<String, u32> = IndexMap::new();
        for node in self.nodes.values() {
            let Some(pid) = &node.parent_id else {
                continue;
            };
            if !self.nodes.contains_key(pid) {
                let inferred = node.level.saturating_sub(1);
                let slot = missing.entry(pid.clone()).or_insert(inferred);
                *slot = (*slot).min(inferred);
            }
        }
        for (pid, level) in missing {
            self.synthesize_placeholder(&pid, level);
        }
    }

    fn synthesize_placeholder(&mut self, id: &str, level: u32) {
        debug!(id, level, "synthesizing placeholder for dangling parent reference");
        let node = Node {
            id: id.to_string(),
            title: String::new(),
            description: String::new(),
            parent_id: None,
            level,
            kind: NodeKind::Blank,
            page_ref: None,
            has_children: true,
            children_collapsed: false,
            placeholder: true,
        };
        self.nodes.insert(id.to_string(), node);
    }

    fn rebuild_children(&mut self) {
        let mut children: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for node in self.nodes.values() {
            if let Some(pid) = &node.parent_id {
                children
                    .entry(pid.clone())
                    .or_default()
                    .push(node.id.clone());
            }
        }
        self.children = children;
    }

    /// Recomputes every level from the roots down. Declared levels in the
    /// ingest payload are advisory; the parent chain is authoritative. Nodes
    /// unreachable from any root (a malformed cycle) keep their declared
    /// level.
    fn normalize_levels(&mut self) {
        let mut visited: FxHashSet<String> = FxHashSet::default();
        let mut queue: VecDeque<(String, u32)> = self
            .nodes
            .values()
            .filter(|n| n.is_root())
            .map(|n| (n.id.clone(), 0))
            .collect();
        while let Some((id, level)) = queue.pop_front() {
            if !visited.insert(id.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get_mut(&id) {
                node.level = level;
            }
            if let Some(kids) = self.children.get(&id) {
                for kid in kids.clone() {
                    queue.push_back((kid, level + 1));
                }
            }
        }
        if visited.len() != self.nodes.len() {
            warn!(
                unreachable = self.nodes.len() - visited.len(),
                "nodes unreachable from any root keep their declared level"
            );
        }
    }

    fn refresh_has_children(&mut self) {
        let ids: Vec<String> = self.nodes.keys().cloned().collect();
        for id in ids {
            let has = self.children.get(&id).is_some_and(|c| !c.is_empty());
            if let Some(node) = self.nodes.get_mut(&id) {
                node.has_children = has;
            }
        }
    }
}
