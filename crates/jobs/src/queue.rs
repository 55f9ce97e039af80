//! Ordered, lock-guarded collection of active jobs

use crate::Job;
use lastore_errors::{Error, JobError};
use lastore_types::{JobId, JobInfo};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Shared handle to a job held by a [`JobQueue`]
///
/// All mutations of one job go through its lock, so a progress merge and a
/// phase promotion on the same job never interleave.
#[derive(Debug, Clone)]
pub struct JobHandle {
    id: JobId,
    inner: Arc<Mutex<Job>>,
}

impl JobHandle {
    fn new(job: Job) -> Self {
        Self {
            id: job.id(),
            inner: Arc::new(Mutex::new(job)),
        }
    }

    #[must_use]
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Lock the job for reading or mutation
    ///
    /// Every job mutation leaves the job consistent, so a poisoned lock is
    /// recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, Job> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn info(&self) -> JobInfo {
        self.lock().info()
    }
}

/// Position of a job: creation time, then admission order
type QueueKey = (i64, u64);

#[derive(Debug, Default)]
struct QueueInner {
    ordered: BTreeMap<QueueKey, JobHandle>,
    keys: HashMap<JobId, QueueKey>,
    admitted: u64,
}

/// Active jobs, ordered by creation time
///
/// No two jobs in the queue share a package and a type. Admission, removal
/// and lookup are serialized by one lock, held across the whole
/// duplicate-check-and-insert of [`JobQueue::add`].
#[derive(Debug, Default)]
pub struct JobQueue {
    inner: Mutex<QueueInner>,
}

impl JobQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit a job
    ///
    /// # Errors
    ///
    /// Returns [`JobError::IdInUse`] when a queued job has the same id, or
    /// [`JobError::DuplicateJob`] when one has the same package and type. The
    /// queue is left unchanged in both cases.
    pub fn add(&self, job: Job) -> Result<JobHandle, Error> {
        let mut inner = self.inner();

        if inner.keys.contains_key(&job.id()) {
            return Err(JobError::IdInUse {
                id: job.id().to_string(),
            }
            .into());
        }

        let conflict = inner.ordered.values().any(|existing| {
            let existing = existing.lock();
            existing.package_id() == job.package_id() && existing.job_type() == job.job_type()
        });
        if conflict {
            return Err(JobError::DuplicateJob {
                job_type: job.job_type().to_string(),
                package: job.package_id().to_string(),
            }
            .into());
        }

        inner.admitted += 1;
        let key = (job.create_time(), inner.admitted);
        let handle = JobHandle::new(job);
        inner.keys.insert(handle.id(), key);
        inner.ordered.insert(key, handle.clone());
        debug!(job_id = %handle.id(), queued = inner.ordered.len(), "job admitted");
        Ok(handle)
    }

    /// Remove a job, keeping the order of the rest
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotFound`] when no queued job has this id.
    pub fn remove(&self, id: JobId) -> Result<JobHandle, Error> {
        let mut inner = self.inner();
        let key = inner.keys.remove(&id).ok_or_else(|| not_found(id))?;
        let handle = inner.ordered.remove(&key).ok_or_else(|| not_found(id))?;
        debug!(job_id = %id, queued = inner.ordered.len(), "job removed");
        Ok(handle)
    }

    /// Look up a job by id
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotFound`] when no queued job has this id.
    pub fn find(&self, id: JobId) -> Result<JobHandle, Error> {
        let inner = self.inner();
        inner
            .keys
            .get(&id)
            .and_then(|key| inner.ordered.get(key))
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    #[must_use]
    pub fn contains(&self, id: JobId) -> bool {
        self.inner().keys.contains_key(&id)
    }

    /// Handles of all queued jobs, oldest first
    #[must_use]
    pub fn jobs(&self) -> Vec<JobHandle> {
        self.inner().ordered.values().cloned().collect()
    }

    /// Published snapshots of all queued jobs, oldest first
    #[must_use]
    pub fn snapshots(&self) -> Vec<JobInfo> {
        self.jobs().iter().map(JobHandle::info).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner().ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner().ordered.is_empty()
    }
}

fn not_found(id: JobId) -> Error {
    JobError::NotFound { id: id.to_string() }.into()
}
