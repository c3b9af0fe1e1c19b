use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Per-node animation state.
///
/// `Hidden` is the only state excluded from the render tree; both animating
/// states keep the node renderable so its transition can play out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisibilityState {
    #[default]
    Visible,
    Hidden,
    AnimatingIn,
    AnimatingOut,
}

impl VisibilityState {
    pub fn renderable(self) -> bool {
        !matches!(self, Self::Hidden)
    }

    pub fn animating(self) -> bool {
        matches!(self, Self::AnimatingIn | Self::AnimatingOut)
    }
}

/// Visibility per node id, with a monotonically increasing epoch per entry.
///
/// Deferred transition steps capture the epoch at scheduling time; a step
/// whose epoch no longer matches the entry is stale (the node was toggled
/// again, or deleted and recreated, since the step was queued) and must
/// not be applied. This is the re-entrancy guard for animation-completion
/// callbacks.
#[derive(Debug, Clone, Default)]
pub struct VisibilityMap {
    entries: FxHashMap<String, Entry>,
    next_epoch: u64,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    state: VisibilityState,
    epoch: u64,
}

impl VisibilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn state(&self, id: &str) -> Option<VisibilityState> {
        self.entries.get(id).map(|e| e.state)
    }

    pub fn epoch(&self, id: &str) -> Option<u64> {
        self.entries.get(id).map(|e| e.epoch)
    }

    /// Sets a node's state, invalidating any step scheduled against the
    /// previous epoch. Returns the new epoch for steps that want to settle
    /// this transition later.
    pub fn set(&mut self, id: &str, state: VisibilityState) -> u64 {
        self.next_epoch += 1;
        let epoch = self.next_epoch;
        self.entries
            .insert(id.to_string(), Entry { state, epoch });
        epoch
    }

    /// Applies a deferred transition only if the entry is still at `epoch`.
    /// The epoch is left unchanged so the settle itself does not invalidate
    /// anything.
    pub fn set_if_epoch(&mut self, id: &str, epoch: u64, state: VisibilityState) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) if entry.epoch == epoch => {
                entry.state = state;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.entries.remove(id);
    }
}
