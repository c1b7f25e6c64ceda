// core/scheduler.rs
//
// Timed deferrals for the single-threaded tick loop.
// An action is registered with a due tick and handed back once the clock
// reaches it. Cancelling removes it from the pending set.

/// Handle to a scheduled action for later cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u32);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TaskId,
    due: u64,
    action: T,
}

/// Pending deferred actions ordered by due tick, then registration order.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    pending: Vec<Pending<T>>,
    next_id: u32,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Register `action` to fire at tick `due`.
    pub fn schedule_at(&mut self, due: u64, action: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        // Keep sorted; equal due ticks stay in registration order.
        let idx = self.pending.partition_point(|p| p.due <= due);
        self.pending.insert(idx, Pending { id, due, action });
        id
    }

    /// Remove a pending action. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(idx) = self.pending.iter().position(|p| p.id == id) {
            self.pending.remove(idx);
            true
        } else {
            false
        }
    }

    /// Drop every pending action.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Take all actions due at or before `now`, in firing order.
    pub fn drain_due(&mut self, now: u64) -> Vec<T> {
        let split = self.pending.partition_point(|p| p.due <= now);
        self.pending.drain(..split).map(|p| p.action).collect()
    }

    /// Whether `id` is still pending.
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
