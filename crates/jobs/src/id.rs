//! Job identity allocation

use lastore_types::JobId;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

/// Identity handed to a new job: its id and creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTicket {
    pub id: JobId,
    /// Nanoseconds since the Unix epoch, strictly increasing per allocator
    pub create_time: i64,
}

/// Allocator of job ids and creation times
///
/// Ids count up from 1. Creation times follow the wall clock but never
/// repeat or go backwards, so tickets from one allocator are totally ordered.
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct JobIdAllocator {
    state: Arc<AllocatorState>,
}

#[derive(Debug, Default)]
struct AllocatorState {
    last_id: AtomicU64,
    last_create_time: AtomicI64,
}

impl JobIdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next ticket
    #[must_use]
    pub fn allocate(&self) -> JobTicket {
        let id = self.state.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        let now = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);

        let previous = self
            .state
            .last_create_time
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);

        JobTicket {
            id: JobId::new(id),
            create_time: now.max(previous.saturating_add(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let ids = JobIdAllocator::new();
        assert_eq!(ids.allocate().id, JobId::new(1));
        assert_eq!(ids.allocate().id, JobId::new(2));
    }

    #[test]
    fn test_clones_share_state() {
        let ids = JobIdAllocator::new();
        let other = ids.clone();
        let first = ids.allocate();
        let second = other.allocate();
        assert_eq!(second.id.get(), first.id.get() + 1);
    }

    #[test]
    fn test_create_times_strictly_increase() {
        let ids = JobIdAllocator::new();
        let mut last = i64::MIN;
        for _ in 0..1000 {
            let ticket = ids.allocate();
            assert!(ticket.create_time > last);
            last = ticket.create_time;
        }
    }
}
