use std::collections::BTreeMap;

use kelpie_core::geom::{Point, Vector, point};
use kelpie_core::{ContentPatch, Document, Edge, Node, NodeRecord, Result};
use kelpie_layout::{LayoutOptions, PositionMap, compute_positions, provisional_child_position};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::positions::PositionStore;
use crate::scheduler::{Scheduler, Step};
use crate::selection::Selection;
use crate::viewport::{Viewport, ViewportOptions, content_bounds};
use crate::visibility::{VisibilityMap, VisibilityState};

/// Timing of the visibility state machine, in milliseconds of host time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationOptions {
    /// Duration of the fade/scale transition; a node's state settles once
    /// this much host time has passed.
    pub transition_ms: f64,
    /// One scheduling tick. Separates an expand's flag-clear from its
    /// animation flip, so re-entered nodes exist in the render tree before
    /// their entrance transition starts.
    pub frame_ms: f64,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            transition_ms: 300.0,
            frame_ms: 16.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiagramOptions {
    pub layout: LayoutOptions,
    pub viewport: ViewportOptions,
    pub animation: AnimationOptions,
}

/// What the rendering layer needs to draw one node. How the node is painted
/// is entirely the renderer's business.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    /// Canonical position plus any in-progress drag delta, content space.
    pub position: Point,
    /// `position` mapped through the viewport transform.
    pub screen_position: Point,
    pub visibility: VisibilityState,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub x: f64,
    pub y: f64,
}

/// Export of the whole diagram state. Every position key matches a live
/// node id and every edge references live ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub positions: BTreeMap<String, PositionRecord>,
}

/// The single composition point for a diagram surface.
///
/// Owns the document, position store, selection, visibility machine,
/// scheduler and viewport, and exposes every mutation/selection/viewport
/// operation a node renderer needs; renderers consume this object instead
/// of having individual callbacks threaded down to them.
///
/// All methods run on the host's UI thread; a structural mutation is fully
/// applied across every sub-store before the method returns, so a render
/// pass never observes a half-applied change.
#[derive(Debug)]
pub struct DiagramController {
    doc: Document,
    positions: PositionStore,
    visibility: VisibilityMap,
    selection: Selection,
    scheduler: Scheduler,
    viewport: Viewport,
    options: DiagramOptions,
    /// Bumped on every collapse toggle per node; deferred expand steps
    /// carry the generation they were scheduled under and are dropped when
    /// it moved on.
    collapse_generations: FxHashMap<String, u64>,
    next_generation: u64,
}

impl DiagramController {
    pub fn new(options: DiagramOptions) -> Self {
        Self {
            doc: Document::new(),
            positions: PositionStore::new(),
            visibility: VisibilityMap::new(),
            selection: Selection::new(),
            scheduler: Scheduler::new(),
            viewport: Viewport::new(options.viewport),
            options,
            collapse_generations: FxHashMap::default(),
            next_generation: 0,
        }
    }

    /// Builds a controller from the generation service's initial batch:
    /// ingest, one full layout pass, everything visible, and an immediate
    /// (non-animated) fit of the viewport to the content.
    pub fn from_records(records: Vec<NodeRecord>, options: DiagramOptions) -> Self {
        let mut controller = Self::new(options);
        controller.doc = Document::from_records(records);
        let placed = compute_positions(
            &controller.doc,
            &PositionMap::default(),
            &controller.options.layout,
        );
        controller.positions.extend_new(placed);
        let ids: Vec<String> = controller.doc.node_ids().map(str::to_string).collect();
        for id in ids {
            controller.visibility.set(&id, VisibilityState::Visible);
        }
        controller.fit_to_content();
        controller
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    pub fn add_child(&mut self, parent_id: &str, title: &str, description: &str) -> Result<String> {
        self.add_child_with_id(parent_id, title, description, None)
    }

    /// Creates a node one level below `parent_id`.
    ///
    /// The provisional position is committed to the store before the node
    /// gains a visibility entry, so the first render pass that sees it
    /// already has a defined position and there is no one-frame jump.
    pub fn add_child_with_id(
        &mut self,
        parent_id: &str,
        title: &str,
        description: &str,
        explicit_id: Option<String>,
    ) -> Result<String> {
        let sibling_count = self.doc.child_ids(parent_id).len();
        let id = self.doc.add_child(parent_id, title, description, explicit_id)?;

        let parent_position = match self.positions.canonical(parent_id) {
            Some(p) => p,
            None => {
                // The parent was just synthesized (or never placed): give it
                // a laid-out spot before deriving the child's from it.
                let placed = compute_positions(
                    &self.doc,
                    &self.canonical_position_map(),
                    &self.options.layout,
                );
                let p = placed.get(parent_id).copied().unwrap_or_else(|| {
                    warn!(parent_id, "parent has no layout position, using fallback origin");
                    self.fallback_position()
                });
                self.positions.claim(parent_id, p);
                self.visibility.set(parent_id, VisibilityState::Visible);
                p
            }
        };

        let provisional =
            provisional_child_position(parent_position, sibling_count, &self.options.layout);
        self.positions.claim(&id, provisional);

        let state = if self.doc.has_collapsed_ancestor(&id) {
            VisibilityState::Hidden
        } else if self.visibility.state(parent_id) == Some(VisibilityState::AnimatingIn) {
            VisibilityState::AnimatingIn
        } else {
            VisibilityState::Visible
        };
        let epoch = self.visibility.set(&id, state);
        if state == VisibilityState::AnimatingIn {
            self.scheduler.schedule_in(
                self.options.animation.transition_ms,
                Step::SettleVisibility {
                    id: id.clone(),
                    epoch,
                    state: VisibilityState::Visible,
                },
            );
        }
        trace!(id = %id, parent_id, "added child node");
        Ok(id)
    }

    pub fn update_content(&mut self, id: &str, patch: ContentPatch) {
        self.doc.update_content(id, patch);
    }

    /// Deletes a node; its children are reparented (never deleted) by the
    /// document, and every per-node side table drops the id. Unknown ids
    /// are a no-op.
    pub fn delete_node(&mut self, id: &str) -> bool {
        if self.doc.delete_node(id).is_none() {
            return false;
        }
        self.positions.remove(id);
        self.visibility.remove(id);
        self.selection.remove(id);
        self.collapse_generations.remove(id);
        trace!(id, "deleted node");
        true
    }

    /// Toggles the children-collapsed flag on `id` and drives the subtree's
    /// animation states.
    ///
    /// Collapse puts every renderable descendant in `AnimatingOut` now and
    /// schedules the flip to `Hidden` after the transition. Expand clears
    /// the flag now but defers the `AnimatingIn` flip by one tick: a node
    /// must re-enter the render tree before its entrance transition plays.
    pub fn toggle_collapse(&mut self, id: &str) {
        let Some(node) = self.doc.get(id) else {
            return;
        };
        let was_collapsed = node.children_collapsed;
        let generation = self.bump_generation(id);

        if was_collapsed {
            self.doc.set_children_collapsed(id, false);
            self.scheduler.schedule_in(
                self.options.animation.frame_ms,
                Step::AnimateExpand {
                    id: id.to_string(),
                    generation,
                },
            );
        } else {
            self.doc.set_children_collapsed(id, true);
            for descendant in self.doc.descendants(id) {
                let Some(state) = self.visibility.state(&descendant) else {
                    continue;
                };
                if state == VisibilityState::Hidden {
                    // already hidden under a nested collapse
                    continue;
                }
                let epoch = self.visibility.set(&descendant, VisibilityState::AnimatingOut);
                self.scheduler.schedule_in(
                    self.options.animation.transition_ms,
                    Step::SettleVisibility {
                        id: descendant,
                        epoch,
                        state: VisibilityState::Hidden,
                    },
                );
            }
        }
    }

    /// Advances the engine clock; due deferred steps are applied in order.
    pub fn tick(&mut self, elapsed_ms: f64) {
        for step in self.scheduler.tick(elapsed_ms) {
            self.apply_step(step);
        }
    }

    fn apply_step(&mut self, step: Step) {
        match step {
            Step::SettleVisibility { id, epoch, state } => {
                if !self.doc.contains(&id) {
                    return;
                }
                self.visibility.set_if_epoch(&id, epoch, state);
            }
            Step::AnimateExpand { id, generation } => {
                if self.collapse_generations.get(&id).copied() != Some(generation) {
                    // toggled again before this tick fired
                    return;
                }
                let Some(node) = self.doc.get(&id) else {
                    return;
                };
                if node.children_collapsed {
                    return;
                }
                for descendant in self.doc.descendants(&id) {
                    if self.doc.has_collapsed_ancestor(&descendant) {
                        // still blocked by a nested collapse below `id`
                        continue;
                    }
                    match self.visibility.state(&descendant) {
                        Some(VisibilityState::Hidden) | Some(VisibilityState::AnimatingOut) => {}
                        _ => continue,
                    }
                    let epoch = self
                        .visibility
                        .set(&descendant, VisibilityState::AnimatingIn);
                    self.scheduler.schedule_in(
                        self.options.animation.transition_ms,
                        Step::SettleVisibility {
                            id: descendant,
                            epoch,
                            state: VisibilityState::Visible,
                        },
                    );
                }
            }
        }
    }

    fn bump_generation(&mut self, id: &str) -> u64 {
        self.next_generation += 1;
        self.collapse_generations
            .insert(id.to_string(), self.next_generation);
        self.next_generation
    }

    pub fn click_select(&mut self, id: &str, modifier: bool) {
        if self.doc.contains(id) {
            self.selection.click(id, modifier);
        }
    }

    pub fn click_background(&mut self) {
        self.selection.clear();
    }

    pub fn escape(&mut self) {
        self.selection.clear();
    }

    /// One drag frame: `delta` is the pointer movement since the previous
    /// frame. When the dragged node belongs to a multi-selection the same
    /// delta fans out to every selected node, keeping the group rigid no
    /// matter which member the pointer grabbed.
    pub fn pointer_drag(&mut self, id: &str, delta: Vector) {
        if !self.doc.contains(id) {
            return;
        }
        if self.selection.is_multi() && self.selection.contains(id) {
            let ids: Vec<String> = self.selection.ids().map(str::to_string).collect();
            for selected in ids {
                self.positions.add_drag_delta(&selected, delta);
            }
        } else {
            self.positions.add_drag_delta(id, delta);
        }
    }

    /// Pointer-up always commits; there is no drag-cancel.
    pub fn pointer_up(&mut self) {
        let committed = self.positions.commit_drags();
        if !committed.is_empty() {
            trace!(count = committed.len(), "committed drag deltas");
        }
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Fits the viewport to the bounding box of all node positions expanded
    /// by the node footprint. With no positioned nodes this falls back to
    /// the default view.
    pub fn fit_to_content(&mut self) {
        let bounds = content_bounds(
            self.doc
                .nodes()
                .filter_map(|n| self.positions.effective(&n.id)),
            self.options.viewport.node_size,
        );
        self.viewport.fit_to_content(bounds);
    }

    /// Render-facing view of one node. A node that was never given a
    /// canonical position renders at a fallback origin rather than blocking
    /// the pass.
    pub fn node_view(&self, id: &str) -> Option<NodeView> {
        if !self.doc.contains(id) {
            return None;
        }
        let visibility = self.visibility.state(id).unwrap_or_default();
        let position = self.positions.effective(id).unwrap_or_else(|| {
            warn!(id, "node has no canonical position, rendering at fallback origin");
            self.fallback_position()
        });
        Some(NodeView {
            position,
            screen_position: self.viewport.to_screen(position),
            visibility,
            selected: self.selection.contains(id),
        })
    }

    /// Everything the renderer should draw this pass (every node not
    /// `Hidden`), in creation order.
    pub fn render_nodes(&self) -> Vec<(&Node, NodeView)> {
        self.doc
            .nodes()
            .filter_map(|node| {
                let view = self.node_view(&node.id)?;
                view.visibility.renderable().then_some((node, view))
            })
            .collect()
    }

    /// Consistent export of nodes, edges and canonical positions.
    pub fn snapshot(&self) -> Snapshot {
        let nodes: Vec<Node> = self.doc.nodes().cloned().collect();
        let edges = self.doc.edges();
        let mut positions = BTreeMap::new();
        for node in &nodes {
            if let Some(p) = self.positions.canonical(&node.id) {
                positions.insert(node.id.clone(), PositionRecord { x: p.x, y: p.y });
            }
        }
        Snapshot {
            nodes,
            edges,
            positions,
        }
    }

    fn canonical_position_map(&self) -> PositionMap {
        self.positions
            .iter_canonical()
            .map(|(id, p)| (id.to_string(), p))
            .collect()
    }

    fn fallback_position(&self) -> Point {
        point(self.options.layout.origin_x, self.options.layout.origin_y)
    }
}
