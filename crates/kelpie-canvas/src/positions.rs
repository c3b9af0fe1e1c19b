use kelpie_core::geom::{Point, Vector};
use rustc_hash::FxHashMap;
use tracing::warn;

/// Canonical node positions plus the transient per-drag overrides.
///
/// A canonical position is written exactly once per node (by the layout
/// engine or the provisional child placement) and thereafter only moves
/// when a drag commits. Drag deltas live in a separate map that exists only
/// between drag-start and drag-stop; rendering adds them on top, and
/// `commit_drags` folds them in.
#[derive(Debug, Clone, Default)]
pub struct PositionStore {
    canonical: FxHashMap<String, Point>,
    drag: FxHashMap<String, Vector>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.canonical.contains_key(id)
    }

    /// Sets the canonical position for a node that does not have one yet.
    /// Returns false (and changes nothing) when the node is already placed.
    pub fn claim(&mut self, id: &str, position: Point) -> bool {
        if self.canonical.contains_key(id) {
            return false;
        }
        self.canonical.insert(id.to_string(), position);
        true
    }

    /// Adopts freshly computed layout positions, skipping ids already placed.
    pub fn extend_new(&mut self, new: impl IntoIterator<Item = (String, Point)>) {
        for (id, position) in new {
            self.canonical.entry(id).or_insert(position);
        }
    }

    pub fn canonical(&self, id: &str) -> Option<Point> {
        self.canonical.get(id).copied()
    }

    /// Canonical position plus any in-progress drag delta.
    pub fn effective(&self, id: &str) -> Option<Point> {
        let base = self.canonical.get(id).copied()?;
        Some(match self.drag.get(id) {
            Some(delta) => base + *delta,
            None => base,
        })
    }

    pub fn drag_delta(&self, id: &str) -> Option<Vector> {
        self.drag.get(id).copied()
    }

    pub fn has_active_drag(&self) -> bool {
        !self.drag.is_empty()
    }

    /// Accumulates one drag frame's delta onto a node's transient override.
    pub fn add_drag_delta(&mut self, id: &str, delta: Vector) {
        *self.drag.entry(id.to_string()).or_insert_with(Vector::zero) += delta;
    }

    /// Drag-stop: folds every non-zero transient delta into the canonical
    /// position and clears the transient map. Returns the ids whose
    /// canonical position moved, sorted for deterministic consumption.
    pub fn commit_drags(&mut self) -> Vec<String> {
        let mut committed = Vec::new();
        for (id, delta) in self.drag.drain() {
            if delta.x == 0.0 && delta.y == 0.0 {
                continue;
            }
            match self.canonical.get_mut(&id) {
                Some(position) => {
                    *position += delta;
                    committed.push(id);
                }
                None => warn!(id = %id, "discarding drag delta for a node with no canonical position"),
            }
        }
        committed.sort();
        committed
    }

    pub fn remove(&mut self, id: &str) {
        self.canonical.remove(id);
        self.drag.remove(id);
    }

    pub fn iter_canonical(&self) -> impl Iterator<Item = (&str, Point)> {
        self.canonical.iter().map(|(id, p)| (id.as_str(), *p))
    }
}
