#![forbid(unsafe_code)]

//! Deterministic stacked-rank layout for rooted node forests.
//!
//! The algorithm is deliberately simple and incremental rather than batch:
//! - roots sit at a fixed horizontal origin, stacked at `row_spacing`;
//! - a deeper node's column is `level * column_width`;
//! - its row starts at the parent's row and advances downward until it finds
//!   a `(level, slot)` pair no other subtree has claimed;
//! - nodes that already have a position are never moved, and their rows are
//!   claimed up front so new nodes route around them.
//!
//! Processing is breadth-first by level, so every parent is placed before
//! its children.

use kelpie_core::Document;
use kelpie_core::geom::{Point, point};
use rustc_hash::{FxHashMap, FxHashSet};

pub type PositionMap = FxHashMap<String, Point>;

/// Axis along which a freshly added child is provisionally offset from its
/// parent before the next full layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutOrientation {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub origin_x: f64,
    pub origin_y: f64,
    /// Vertical distance between two rows of the same level.
    pub row_spacing: f64,
    /// Horizontal distance between two consecutive levels.
    pub column_width: f64,
    pub orientation: LayoutOrientation,
    /// Base offset of a provisionally placed child from its parent.
    pub child_offset: f64,
    /// Additional provisional offset per already-present sibling.
    pub sibling_spacing: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            row_spacing: 120.0,
            column_width: 300.0,
            orientation: LayoutOrientation::Horizontal,
            child_offset: 40.0,
            sibling_spacing: 60.0,
        }
    }
}

impl LayoutOptions {
    /// Row index of a y-coordinate on this layout's vertical grid.
    pub fn slot_index(&self, y: f64) -> i64 {
        if self.row_spacing <= 0.0 {
            return 0;
        }
        ((y - self.origin_y) / self.row_spacing).round() as i64
    }

    pub fn slot_y(&self, slot: i64) -> f64 {
        self.origin_y + slot as f64 * self.row_spacing
    }

    pub fn column_x(&self, level: u32) -> f64 {
        self.origin_x + f64::from(level) * self.column_width
    }
}

/// Assigns a position to every node of `doc` that has none in `existing`.
///
/// Returns only the newly computed positions; entries already present in
/// `existing` are never recomputed or overwritten, which makes the layout
/// idempotent and keeps manual drags stable across structural changes.
pub fn compute_positions(
    doc: &Document,
    existing: &PositionMap,
    opts: &LayoutOptions,
) -> PositionMap {
    let mut placed = PositionMap::default();
    let mut claims: FxHashSet<(u32, i64)> = FxHashSet::default();

    for (id, pos) in existing {
        if let Some(node) = doc.get(id) {
            claims.insert((node.level, opts.slot_index(pos.y)));
        }
    }

    let mut by_level: Vec<Vec<&kelpie_core::Node>> =
        vec![Vec::new(); doc.max_level() as usize + 1];
    for node in doc.nodes() {
        by_level[node.level as usize].push(node);
    }

    for level_nodes in &by_level {
        for node in level_nodes {
            if existing.contains_key(&node.id) {
                continue;
            }
            let start_y = match node.parent_id.as_deref() {
                None => opts.origin_y,
                Some(pid) => existing
                    .get(pid)
                    .or_else(|| placed.get(pid))
                    .map(|p| p.y)
                    // A missing parent position means the reference was
                    // dangling; treat the node like a root rather than fail.
                    .unwrap_or(opts.origin_y),
            };
            let mut slot = opts.slot_index(start_y).max(0);
            while claims.contains(&(node.level, slot)) {
                slot += 1;
            }
            claims.insert((node.level, slot));
            placed.insert(
                node.id.clone(),
                point(opts.column_x(node.level), opts.slot_y(slot)),
            );
        }
    }
    placed
}

/// Position committed for a freshly added child before the node becomes
/// renderable, so it never flashes at a default location for one frame.
///
/// The child lands next to its parent, pushed along the orientation axis by
/// a fixed offset plus one `sibling_spacing` per sibling that already
/// exists.
pub fn provisional_child_position(
    parent: Point,
    sibling_count: usize,
    opts: &LayoutOptions,
) -> Point {
    let run = opts.child_offset + sibling_count as f64 * opts.sibling_spacing;
    match opts.orientation {
        LayoutOrientation::Horizontal => point(parent.x + run, parent.y),
        LayoutOrientation::Vertical => point(parent.x, parent.y + run),
    }
}
