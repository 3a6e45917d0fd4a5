use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bps_types::Batch;

/// Bounded FIFO of recent batches, shared between the producer and the
/// connection handlers.
///
/// ```text
///   append ──▶ [ b_oldest, ..., b_newest ] ──▶ evicted from the head
///              └──── at most `capacity` ────┘
/// ```
///
/// The lock is held only to push/evict or to clone `Arc`s out, so a
/// query never copies block bytes and never blocks the producer for
/// longer than a filter pass.
#[derive(Debug)]
pub struct BatchStore {
    capacity: usize,
    batches: Mutex<VecDeque<Arc<Batch>>>,
}

impl BatchStore {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            batches: Mutex::new(VecDeque::with_capacity(capacity.saturating_add(1))),
        }
    }

    /// Append a batch, evicting the oldest while over capacity.
    ///
    /// Returns the number of batches evicted.
    pub fn append(&self, batch: Batch) -> usize {
        let (start, end) = (batch.start, batch.end);
        let mut batches = self.lock();
        batches.push_back(Arc::new(batch));
        let mut evicted = 0;
        while batches.len() > self.capacity {
            batches.pop_front();
            evicted += 1;
        }
        let cached = batches.len();
        drop(batches);
        tracing::trace!(start, end, cached, evicted, "batch appended");
        evicted
    }

    /// Every batch overlapping `[t0, t1]` (inclusive), oldest first.
    ///
    /// Batches are returned whole; a batch that only partly overlaps is
    /// still included in full.
    pub fn query_range(&self, t0: f64, t1: f64) -> Vec<Arc<Batch>> {
        self.lock()
            .iter()
            .filter(|b| b.overlaps(t0, t1))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// End timestamp of the newest batch.
    pub fn latest_end(&self) -> Option<f64> {
        self.lock().back().map(|b| b.end)
    }

    // The deque is valid after any panic in a holder, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Arc<Batch>>> {
        self.batches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
