//! FIFO queue and bounded worker-slot accounting.
//!
//! The scheduler decides when a job executes and nothing else: jobs
//! wait in an unbounded FIFO queue and run as soon as one of the
//! `concurrency` slots frees up. The only backpressure is the
//! concurrency limit itself; the pending queue is never bounded. All
//! queue/slot arithmetic happens under one mutex acquisition, and the
//! lock is never held across an await.

use std::collections::VecDeque;
use std::sync::Mutex;

use renderdeck_core::{JobId, SubmitRender};

/// A submitted job waiting for a worker slot.
#[derive(Debug)]
pub(crate) struct QueueEntry {
    pub job_id: JobId,
    pub input: SubmitRender,
}

/// Snapshot of queue occupancy for status responses.
#[derive(Debug, Clone, Copy)]
pub(crate) struct QueueView {
    pub pending: usize,
    pub active: usize,
    pub concurrency: usize,
}

struct SchedState {
    queue: VecDeque<QueueEntry>,
    active: usize,
}

pub(crate) struct Scheduler {
    state: Mutex<SchedState>,
    concurrency: usize,
}

impl Scheduler {
    pub fn new(concurrency: usize) -> Self {
        Self {
            state: Mutex::new(SchedState {
                queue: VecDeque::new(),
                active: 0,
            }),
            // A zero limit would deadlock every submission.
            concurrency: concurrency.max(1),
        }
    }

    /// Append an entry to the pending queue tail.
    pub fn enqueue(&self, entry: QueueEntry) {
        self.state
            .lock()
            .expect("scheduler lock poisoned")
            .queue
            .push_back(entry);
    }

    /// Claim the queue head if a worker slot is free, incrementing the
    /// active count in the same critical section.
    pub fn claim_next(&self) -> Option<QueueEntry> {
        let mut state = self.state.lock().expect("scheduler lock poisoned");
        Self::claim_locked(&mut state, self.concurrency)
    }

    /// Release a finished job's slot and claim the next waiting entry,
    /// if any. Decrement and re-claim happen under a single lock
    /// acquisition so a concurrent submit can neither starve the queue
    /// nor push the active count past the limit.
    pub fn release_and_claim(&self) -> Option<QueueEntry> {
        let mut state = self.state.lock().expect("scheduler lock poisoned");
        debug_assert!(state.active > 0, "release without a matching claim");
        state.active = state.active.saturating_sub(1);
        Self::claim_locked(&mut state, self.concurrency)
    }

    fn claim_locked(state: &mut SchedState, concurrency: usize) -> Option<QueueEntry> {
        if state.active >= concurrency {
            return None;
        }
        let entry = state.queue.pop_front()?;
        state.active += 1;
        Some(entry)
    }

    /// 1-based position of a job in the pending queue; 0 once it is
    /// running or finished.
    pub fn position_of(&self, job_id: &str) -> usize {
        let state = self.state.lock().expect("scheduler lock poisoned");
        state
            .queue
            .iter()
            .position(|e| e.job_id == job_id)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    pub fn queue_view(&self) -> QueueView {
        let state = self.state.lock().expect("scheduler lock poisoned");
        QueueView {
            pending: state.queue.len(),
            active: state.active,
            concurrency: self.concurrency,
        }
    }
}
