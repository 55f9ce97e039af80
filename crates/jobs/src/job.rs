//! The job entity: identity, phase, reported state and merge rules

use crate::{JobDispatch, JobPhase, JobTicket};
use lastore_config::job_object_path;
use lastore_errors::JobError;
use lastore_events::PropertyValue;
use lastore_types::{
    wire_progress, JobId, JobInfo, JobOptions, JobProperty, JobStatus, JobType, PackageId,
    Progress, ProgressReport,
};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Properties that changed in one mutation, with their new values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobChanges(Vec<PropertyValue>);

impl JobChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, property: JobProperty) -> bool {
        self.0.iter().any(|value| value.property() == property)
    }

    #[must_use]
    pub fn properties(&self) -> Vec<JobProperty> {
        self.0.iter().map(PropertyValue::property).collect()
    }

    #[must_use]
    pub fn into_values(self) -> Vec<PropertyValue> {
        self.0
    }

    fn push(&mut self, value: PropertyValue) {
        self.0.push(value);
    }

    fn extend(&mut self, other: JobChanges) {
        self.0.extend(other.0);
    }
}

/// A tracked package operation
///
/// The id, package and creation time never change. The phase does: a
/// composite job carries a pending phase that replaces the current one in
/// place once the current phase succeeds.
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    package_id: PackageId,
    create_time: i64,
    phase: JobPhase,
    pending: Option<JobPhase>,
    status: JobStatus,
    progress: Progress,
    description: String,
    elapsed_time: Duration,
    started_at: Option<Instant>,
}

impl Job {
    fn with_phase(ticket: JobTicket, package_id: PackageId, phase: JobPhase) -> Self {
        Self {
            id: ticket.id,
            package_id,
            create_time: ticket.create_time,
            phase,
            pending: None,
            status: JobStatus::READY,
            progress: 0.0,
            description: String::new(),
            elapsed_time: Duration::ZERO,
            started_at: None,
        }
    }

    /// Single-phase download from the mirror `region`
    pub fn download(ticket: JobTicket, package_id: impl Into<PackageId>, region: &str) -> Self {
        Self::with_phase(
            ticket,
            package_id.into(),
            JobPhase::Download {
                region: region.to_string(),
            },
        )
    }

    /// Composite install: downloads first, then installs under the same id
    pub fn install(ticket: JobTicket, package_id: impl Into<PackageId>, region: &str) -> Self {
        let mut job = Self::download(ticket, package_id, region);
        job.pending = Some(JobPhase::Install);
        job
    }

    /// Single-phase removal
    pub fn remove(ticket: JobTicket, package_id: impl Into<PackageId>) -> Self {
        Self::with_phase(ticket, package_id.into(), JobPhase::Remove)
    }

    /// Job of the given type; installs are composite
    pub fn for_type(
        ticket: JobTicket,
        job_type: JobType,
        package_id: impl Into<PackageId>,
        region: &str,
    ) -> Self {
        match job_type {
            JobType::Install => Self::install(ticket, package_id, region),
            single => {
                let phase = JobPhase::for_type(single, region);
                Self::with_phase(ticket, package_id.into(), phase)
            }
        }
    }

    #[must_use]
    pub fn id(&self) -> JobId {
        self.id
    }

    #[must_use]
    pub fn package_id(&self) -> &PackageId {
        &self.package_id
    }

    #[must_use]
    pub fn create_time(&self) -> i64 {
        self.create_time
    }

    #[must_use]
    pub fn job_type(&self) -> JobType {
        self.phase.job_type()
    }

    #[must_use]
    pub fn phase(&self) -> &JobPhase {
        &self.phase
    }

    #[must_use]
    pub fn pending_phase(&self) -> Option<&JobPhase> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn options(&self) -> JobOptions {
        self.phase.options()
    }

    #[must_use]
    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn elapsed_time(&self) -> Duration {
        self.elapsed_time
    }

    #[must_use]
    pub fn object_path(&self) -> String {
        job_object_path(self.id)
    }

    /// Published snapshot of this job
    #[must_use]
    pub fn info(&self) -> JobInfo {
        JobInfo {
            id: self.id,
            package_id: self.package_id.clone(),
            job_type: self.job_type(),
            status: self.status.clone(),
            progress: self.progress,
            description: self.description.clone(),
            create_time: self.create_time,
            object_path: self.object_path(),
        }
    }

    /// Backend request for the current phase
    #[must_use]
    pub fn dispatch(&self) -> JobDispatch {
        JobDispatch {
            job_id: self.id,
            package_id: self.package_id.clone(),
            phase: self.phase.clone(),
        }
    }

    /// Record that the backend accepted this job
    ///
    /// Elapsed time counts from the first successful dispatch, across phases.
    pub fn mark_dispatched(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    /// Merge a backend report, returning the properties that changed
    ///
    /// Each field changes only when its value differs; a report without a
    /// progress value never touches the stored progress.
    #[allow(clippy::float_cmp)]
    pub fn update_info(&mut self, report: &ProgressReport) -> JobChanges {
        let mut changes = JobChanges::default();

        if report.description != self.description {
            self.description.clone_from(&report.description);
            changes.push(PropertyValue::Description(self.description.clone()));
        }

        if report.status != self.status {
            self.status = report.status.clone();
            changes.push(PropertyValue::Status(self.status.clone()));
        }

        if let Some(progress) = report.progress.and_then(wire_progress) {
            if progress != self.progress {
                self.progress = progress;
                changes.push(PropertyValue::Progress(progress));
            }
        }

        self.refresh_elapsed();
        debug!(
            job_id = %self.id,
            package = %self.package_id,
            progress = self.progress,
            status = %self.status,
            description = %self.description,
            "job info updated"
        );
        changes
    }

    /// Replace this job's operation with `next` in place
    ///
    /// `next` must carry the same id. The type always counts as changed;
    /// status, progress and description follow the merge rule of
    /// [`Job::update_info`]. Id, package and creation time are kept.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::IdentityMismatch`] without touching `self` when the
    /// ids differ. This is a logic error in the caller.
    pub fn swap(&mut self, next: Job) -> Result<JobChanges, JobError> {
        if next.id != self.id {
            error!(
                current = %self.id,
                next = %next.id,
                "refusing to swap jobs with different ids"
            );
            return Err(JobError::IdentityMismatch {
                current: self.id.to_string(),
                next: next.id.to_string(),
            });
        }
        Ok(self.adopt(next))
    }

    /// Whether a later phase is waiting for the current one to finish
    #[must_use]
    pub fn has_pending_phase(&self) -> bool {
        self.pending.is_some()
    }

    /// Promote the pending phase to the current one
    ///
    /// Returns `None` for single-phase jobs.
    pub fn promote(&mut self) -> Option<JobChanges> {
        let phase = self.pending.take()?;
        let next = Self::with_phase(
            JobTicket {
                id: self.id,
                create_time: self.create_time,
            },
            self.package_id.clone(),
            phase,
        );
        Some(self.adopt(next))
    }

    fn adopt(&mut self, next: Job) -> JobChanges {
        debug!(
            job_id = %self.id,
            from = %self.job_type(),
            to = %next.job_type(),
            "swapping job phase"
        );
        let mut changes = JobChanges::default();
        self.phase = next.phase;
        self.pending = next.pending;
        changes.push(PropertyValue::Type(self.job_type()));

        let report = ProgressReport {
            job_id: self.id,
            description: next.description,
            status: next.status,
            progress: Some(next.progress),
        };
        changes.extend(self.update_info(&report));
        changes
    }

    fn refresh_elapsed(&mut self) {
        if let Some(started_at) = self.started_at {
            self.elapsed_time = self.elapsed_time.max(started_at.elapsed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JobIdAllocator;
    use lastore_types::REGION_OPTION;

    fn report(
        job: &Job,
        description: &str,
        status: JobStatus,
        progress: Option<f64>,
    ) -> ProgressReport {
        ProgressReport {
            job_id: job.id(),
            description: description.to_string(),
            status,
            progress,
        }
    }

    #[test]
    fn test_new_job_is_ready() {
        let ids = JobIdAllocator::new();
        let job = Job::remove(ids.allocate(), "pkg-B");
        assert_eq!(job.status(), &JobStatus::READY);
        assert_eq!(job.progress(), 0.0);
        assert_eq!(job.job_type(), JobType::Remove);
        assert!(job.options().is_empty());
        assert!(!job.has_pending_phase());
    }

    #[test]
    fn test_install_job_starts_as_download() {
        let ids = JobIdAllocator::new();
        let job = Job::install(ids.allocate(), "pkg-A", "cn");
        assert_eq!(job.job_type(), JobType::Download);
        assert_eq!(job.options().get(REGION_OPTION).map(String::as_str), Some("cn"));
        assert_eq!(job.pending_phase(), Some(&JobPhase::Install));
        assert_eq!(job.package_id().as_str(), "pkg-A");
    }

    #[test]
    fn test_update_info_flags_only_changed_fields() {
        let ids = JobIdAllocator::new();
        let mut job = Job::download(ids.allocate(), "pkg-B", "");

        let first = report(&job, "fetching", JobStatus::RUNNING, Some(0.25));
        let changes = job.update_info(&first);
        assert_eq!(
            changes.properties(),
            vec![JobProperty::Description, JobProperty::Status, JobProperty::Progress]
        );

        let changes = job.update_info(&first);
        assert!(changes.is_empty());

        let changes = job.update_info(&report(&job, "fetching", JobStatus::RUNNING, Some(0.5)));
        assert_eq!(changes.properties(), vec![JobProperty::Progress]);
        assert_eq!(job.progress(), 0.5);
    }

    #[test]
    fn test_missing_progress_is_ignored() {
        let ids = JobIdAllocator::new();
        let mut job = Job::download(ids.allocate(), "pkg-B", "");
        job.update_info(&report(&job, "", JobStatus::RUNNING, Some(0.4)));

        let changes = job.update_info(&report(&job, "", JobStatus::RUNNING, None));
        assert!(!changes.contains(JobProperty::Progress));
        assert_eq!(job.progress(), 0.4);

        let wire = ProgressReport::from_wire(
            job.id(),
            String::new(),
            JobStatus::RUNNING,
            ProgressReport::NO_UPDATE,
        );
        assert!(job.update_info(&wire).is_empty());
        assert_eq!(job.progress(), 0.4);
    }

    #[test]
    fn test_sentinel_progress_from_backend_json_is_ignored() {
        let ids = JobIdAllocator::new();
        let mut job = Job::download(ids.allocate(), "pkg-B", "");
        job.update_info(&report(&job, "", JobStatus::RUNNING, Some(0.4)));

        let json = format!(
            r#"{{"job_id":{},"description":"","status":"running","progress":-1}}"#,
            job.id()
        );
        let decoded: ProgressReport = serde_json::from_str(&json).unwrap();
        assert!(job.update_info(&decoded).is_empty());
        assert_eq!(job.progress(), 0.4);

        let changes = job.update_info(&report(
            &job,
            "",
            JobStatus::RUNNING,
            Some(ProgressReport::NO_UPDATE),
        ));
        assert!(!changes.contains(JobProperty::Progress));
        assert_eq!(job.progress(), 0.4);
    }

    #[test]
    fn test_progress_is_clamped() {
        let ids = JobIdAllocator::new();
        let mut job = Job::download(ids.allocate(), "pkg-B", "");
        job.update_info(&report(&job, "", JobStatus::RUNNING, Some(7.0)));
        assert_eq!(job.progress(), 1.0);
    }

    #[test]
    fn test_swap_same_id_adopts_next() {
        let ids = JobIdAllocator::new();
        let ticket = ids.allocate();
        let mut current = Job::download(ticket, "pkg-A", "cn");
        current.update_info(&report(&current, "done", JobStatus::SUCCEED, Some(1.0)));

        let later = ids.allocate();
        let mut next = Job::with_phase(
            JobTicket {
                id: ticket.id,
                create_time: later.create_time,
            },
            PackageId::new("pkg-A"),
            JobPhase::Install,
        );
        next.status = JobStatus::RUNNING;
        next.progress = 0.1;
        next.description = "installing".into();

        let changes = current.swap(next).unwrap();
        assert_eq!(current.id(), ticket.id);
        assert_eq!(current.create_time(), ticket.create_time);
        assert_eq!(current.job_type(), JobType::Install);
        assert_eq!(current.status(), &JobStatus::RUNNING);
        assert_eq!(current.progress(), 0.1);
        assert_eq!(current.description(), "installing");
        assert_eq!(
            changes.properties(),
            vec![
                JobProperty::Type,
                JobProperty::Description,
                JobProperty::Status,
                JobProperty::Progress
            ]
        );
    }

    #[test]
    fn test_swap_different_id_is_rejected_without_mutation() {
        let ids = JobIdAllocator::new();
        let mut current = Job::download(ids.allocate(), "pkg-A", "cn");
        let next = Job::remove(ids.allocate(), "pkg-A");
        let before = current.info();

        let err = current.swap(next).unwrap_err();
        assert!(matches!(err, JobError::IdentityMismatch { .. }));
        assert_eq!(current.info(), before);
        assert!(current.options().contains_key(REGION_OPTION));
    }

    #[test]
    fn test_promote_resets_reported_state() {
        let ids = JobIdAllocator::new();
        let mut job = Job::install(ids.allocate(), "pkg-A", "cn");
        let id = job.id();
        job.update_info(&report(&job, "downloaded", JobStatus::SUCCEED, Some(1.0)));

        let changes = job.promote().unwrap();
        assert_eq!(job.id(), id);
        assert_eq!(job.job_type(), JobType::Install);
        assert_eq!(job.status(), &JobStatus::READY);
        assert_eq!(job.progress(), 0.0);
        assert!(job.options().is_empty());
        assert!(changes.contains(JobProperty::Type));
        assert!(changes.contains(JobProperty::Status));
        assert!(job.promote().is_none());
    }

    #[test]
    fn test_type_counts_as_changed_even_when_equal() {
        let ids = JobIdAllocator::new();
        let ticket = ids.allocate();
        let mut current = Job::remove(ticket, "pkg-C");
        let next = Job::remove(ticket, "pkg-C");
        let changes = current.swap(next).unwrap();
        assert_eq!(changes.properties(), vec![JobProperty::Type]);
    }
}
