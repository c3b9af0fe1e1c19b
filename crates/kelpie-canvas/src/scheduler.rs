use crate::visibility::VisibilityState;

/// A deferred engine step.
///
/// The scheduler stores plain data rather than closures so that applying a
/// step is an ordinary `&mut self` call on the controller and no re-entrant
/// mutation can sneak in through a captured reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Completes a visibility transition, guarded by the node's epoch at
    /// scheduling time.
    SettleVisibility {
        id: String,
        epoch: u64,
        state: VisibilityState,
    },
    /// Second half of an expand: flips re-entered descendants to their
    /// entrance animation, guarded by the ancestor's collapse generation.
    AnimateExpand { id: String, generation: u64 },
}

#[derive(Debug, Clone)]
struct Deferred {
    due_ms: f64,
    seq: u64,
    step: Step,
}

/// Host-driven deferred-step queue.
///
/// The engine never reads wall-clock time: the host advances a monotonic
/// clock through `tick(elapsed_ms)` and the queue releases steps in due
/// order (insertion order breaking ties). Tests drive time the same way,
/// which keeps every animation sequence deterministic.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: f64,
    queue: Vec<Deferred>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn schedule_in(&mut self, delay_ms: f64, step: Step) {
        self.queue.push(Deferred {
            due_ms: self.now_ms + delay_ms.max(0.0),
            seq: self.next_seq,
            step,
        });
        self.next_seq += 1;
    }

    /// Advances the clock and returns every step that came due.
    pub fn tick(&mut self, elapsed_ms: f64) -> Vec<Step> {
        self.now_ms += elapsed_ms.max(0.0);
        let now = self.now_ms;
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|d| d.due_ms <= now);
        self.queue = rest;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|d| d.step).collect()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
