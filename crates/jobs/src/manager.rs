//! Request API and progress pump tying the queue to a package backend

use crate::{
    Job, JobChanges, JobDispatch, JobHandle, JobIdAllocator, JobQueue, PackageBackend,
    ProgressReceiver,
};
use lastore_config::{Config, JOB_INTERFACE, SERVICE_NAME};
use lastore_errors::Error;
use lastore_events::{AppEvent, EventEmitter, EventMeta, EventSender, FailureContext, JobEvent};
use lastore_types::{JobId, JobInfo, JobProperty, JobStatus, JobType, PackageId, ProgressReport};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const PROGRESS_PUMP: &str = "progress pump";

/// Owner of the job queue and the only writer of job state
///
/// Requests create and admit jobs, dispatch them to the backend and publish
/// their changes as [`JobEvent`]s. Backend progress arrives through
/// [`JobManager::run`], which merges each report into its job and promotes
/// composite jobs to their next phase once the current one succeeds.
pub struct JobManager {
    queue: JobQueue,
    ids: JobIdAllocator,
    backend: Arc<dyn PackageBackend>,
    config: Config,
    events: Option<EventSender>,
}

impl std::fmt::Debug for JobManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobManager")
            .field("queue", &self.queue)
            .field("ids", &self.ids)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EventEmitter for JobManager {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }

    fn enrich_event_meta(&self, event: &AppEvent, meta: &mut EventMeta) {
        meta.labels.insert("service".to_string(), SERVICE_NAME.to_string());
        if matches!(event, AppEvent::Job(_)) {
            meta.labels
                .insert("interface".to_string(), JOB_INTERFACE.to_string());
        }
    }
}

impl JobManager {
    pub fn new(backend: Arc<dyn PackageBackend>, config: Config) -> Self {
        Self {
            queue: JobQueue::new(),
            ids: JobIdAllocator::new(),
            backend,
            config,
            events: None,
        }
    }

    /// Publish job events on `sender`
    #[must_use]
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    /// Use a shared id allocator
    #[must_use]
    pub fn with_id_allocator(mut self, ids: JobIdAllocator) -> Self {
        self.ids = ids;
        self
    }

    #[must_use]
    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Download `package` without installing it
    ///
    /// # Errors
    ///
    /// See [`JobManager::submit`].
    pub async fn download_package(
        &self,
        package: impl Into<PackageId>,
        region: Option<&str>,
    ) -> Result<JobId, Error> {
        self.request(JobType::Download, package.into(), region).await
    }

    /// Download and install `package` as one composite job
    ///
    /// # Errors
    ///
    /// See [`JobManager::submit`].
    pub async fn install_package(
        &self,
        package: impl Into<PackageId>,
        region: Option<&str>,
    ) -> Result<JobId, Error> {
        self.request(JobType::Install, package.into(), region).await
    }

    /// Remove `package`
    ///
    /// # Errors
    ///
    /// See [`JobManager::submit`].
    pub async fn remove_package(&self, package: impl Into<PackageId>) -> Result<JobId, Error> {
        self.request(JobType::Remove, package.into(), None).await
    }

    async fn request(
        &self,
        job_type: JobType,
        package: PackageId,
        region: Option<&str>,
    ) -> Result<JobId, Error> {
        let region = self.config.region_or_default(region);
        let job = Job::for_type(self.ids.allocate(), job_type, package, &region);
        self.submit(job).await
    }

    /// Admit a job and, when auto-start is on, dispatch it
    ///
    /// # Errors
    ///
    /// Returns `DuplicateJob` when an equal job is queued. Backend errors are
    /// returned unchanged; the job then stays queued in `ready` state and can
    /// be retried with [`JobManager::start_job`] or dropped with
    /// [`JobManager::clean_job`].
    pub async fn submit(&self, job: Job) -> Result<JobId, Error> {
        let handle = self.queue.add(job)?;
        let info = handle.info();
        info!(
            job_id = %info.id,
            package = %info.package_id,
            job_type = %info.job_type,
            "job queued"
        );
        self.emit_job(JobEvent::Added { job: info });

        if self.config.jobs.auto_start {
            self.dispatch(&handle).await?;
        }
        Ok(handle.id())
    }

    /// Dispatch the current phase of a queued job
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids, or the backend's error unchanged.
    pub async fn start_job(&self, id: JobId) -> Result<(), Error> {
        let handle = self.queue.find(id)?;
        self.dispatch(&handle).await
    }

    /// Drop a job's bookkeeping entry
    ///
    /// Does not cancel work the backend may still be doing.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn clean_job(&self, id: JobId) -> Result<JobInfo, Error> {
        let handle = self.queue.remove(id)?;
        self.emit_job(JobEvent::Removed { job_id: id });
        Ok(handle.info())
    }

    /// Published snapshot of one job
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn get_job(&self, id: JobId) -> Result<JobInfo, Error> {
        Ok(self.queue.find(id)?.info())
    }

    /// Published snapshots of all jobs, oldest first
    #[must_use]
    pub fn job_list(&self) -> Vec<JobInfo> {
        self.queue.snapshots()
    }

    /// Merge one backend report into its job
    ///
    /// Publishes only the properties that changed. A composite job whose
    /// current phase reports `succeed` is promoted in place and its next
    /// phase is dispatched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the report names no queued job, or the
    /// backend's error when dispatching the promoted phase fails.
    pub async fn apply_report(&self, report: &ProgressReport) -> Result<(), Error> {
        let handle = self.queue.find(report.job_id)?;

        let next_phase = {
            let mut job = handle.lock();
            let changes = job.update_info(report);
            if changes.contains(JobProperty::Status) && job.status().is_terminal() {
                info!(
                    job_id = %job.id(),
                    job_type = %job.job_type(),
                    status = %job.status(),
                    pending = job.has_pending_phase(),
                    "job phase finished"
                );
            }
            self.publish_changes(&job, changes);

            if job.status() == &JobStatus::SUCCEED && job.has_pending_phase() {
                let from = job.job_type();
                job.promote().map(|changes| {
                    self.emit_job(JobEvent::PhasePromoted {
                        job_id: job.id(),
                        from,
                        to: job.job_type(),
                    });
                    self.publish_changes(&job, changes);
                    job.dispatch()
                })
            } else {
                None
            }
        };

        match next_phase {
            Some(plan) => self.start_dispatch(&handle, plan).await,
            None => Ok(()),
        }
    }

    /// Pump backend progress into the queue until the channel closes
    pub async fn run(&self, mut progress: ProgressReceiver) {
        self.emit_operation_started(PROGRESS_PUMP);
        let mut clean = true;

        while let Some(report) = progress.recv().await {
            if let Err(err) = self.apply_report(&report).await {
                if err.is_not_found() {
                    debug!(job_id = %report.job_id, "progress for unknown job ignored");
                } else {
                    warn!(job_id = %report.job_id, error = %err, "failed to apply progress report");
                    self.emit_operation_failed(PROGRESS_PUMP, FailureContext::from_error(&err));
                    clean = false;
                }
            }
        }

        debug!("progress channel closed");
        self.emit_operation_completed(PROGRESS_PUMP, clean);
    }

    /// Run the progress pump on its own task
    pub fn spawn(self: Arc<Self>, progress: ProgressReceiver) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(progress).await })
    }

    async fn dispatch(&self, handle: &JobHandle) -> Result<(), Error> {
        let plan = handle.lock().dispatch();
        self.start_dispatch(handle, plan).await
    }

    async fn start_dispatch(&self, handle: &JobHandle, plan: JobDispatch) -> Result<(), Error> {
        match plan.start(self.backend.as_ref()).await {
            Ok(()) => {
                handle.lock().mark_dispatched();
                Ok(())
            }
            Err(err) => {
                self.emit_job(JobEvent::DispatchFailed {
                    job_id: plan.job_id,
                    job_type: plan.job_type(),
                    failure: FailureContext::from_error(&err),
                });
                Err(err)
            }
        }
    }

    fn publish_changes(&self, job: &Job, changes: JobChanges) {
        if changes.is_empty() {
            return;
        }
        self.emit_job(JobEvent::PropertiesChanged {
            job_id: job.id(),
            object_path: job.object_path(),
            changes: changes.into_values(),
        });
    }
}
