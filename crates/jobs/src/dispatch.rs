//! Mapping of a job phase onto backend calls

use crate::{JobPhase, PackageBackend};
use lastore_errors::Error;
use lastore_types::{JobId, JobType, PackageId};
use tracing::debug;

/// Everything needed to hand one job phase to the backend
///
/// Detached from the job so the backend can be awaited without holding the
/// job's lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDispatch {
    pub job_id: JobId,
    pub package_id: PackageId,
    pub phase: JobPhase,
}

impl JobDispatch {
    #[must_use]
    pub fn job_type(&self) -> JobType {
        self.phase.job_type()
    }

    /// Prepare the operation on the backend, then start it
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged. When preparation fails the
    /// backend's `start` is never called.
    pub async fn start<B>(&self, backend: &B) -> Result<(), Error>
    where
        B: PackageBackend + ?Sized,
    {
        debug!(
            job_id = %self.job_id,
            package = %self.package_id,
            job_type = %self.job_type(),
            "dispatching job"
        );
        match &self.phase {
            JobPhase::Download { region } => {
                backend.download(self.job_id, &self.package_id, region).await?;
            }
            JobPhase::Install => backend.install(self.job_id, &self.package_id).await?,
            JobPhase::Remove => backend.remove(self.job_id, &self.package_id).await?,
        }
        backend.start(self.job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lastore_errors::BackendError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedBackend {
        calls: Mutex<Vec<String>>,
        reject_prepare: bool,
    }

    impl ScriptedBackend {
        fn record(&self, call: String) -> Result<(), Error> {
            self.calls.lock().unwrap().push(call);
            if self.reject_prepare {
                return Err(BackendError::DispatchFailed {
                    operation: "prepare".into(),
                    job_id: "1".into(),
                    message: "rejected".into(),
                }
                .into());
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PackageBackend for ScriptedBackend {
        async fn download(
            &self,
            job_id: JobId,
            package_id: &PackageId,
            region: &str,
        ) -> Result<(), Error> {
            self.record(format!("download {job_id} {package_id} {region}"))
        }

        async fn install(&self, job_id: JobId, package_id: &PackageId) -> Result<(), Error> {
            self.record(format!("install {job_id} {package_id}"))
        }

        async fn remove(&self, job_id: JobId, package_id: &PackageId) -> Result<(), Error> {
            self.record(format!("remove {job_id} {package_id}"))
        }

        async fn start(&self, job_id: JobId) -> Result<(), Error> {
            self.calls.lock().unwrap().push(format!("start {job_id}"));
            Ok(())
        }
    }

    fn dispatch(phase: JobPhase) -> JobDispatch {
        JobDispatch {
            job_id: JobId::new(1),
            package_id: PackageId::new("vim"),
            phase,
        }
    }

    #[tokio::test]
    async fn test_each_phase_maps_to_its_backend_call() {
        let backend = ScriptedBackend::default();
        dispatch(JobPhase::Download { region: "cn".into() })
            .start(&backend)
            .await
            .unwrap();
        dispatch(JobPhase::Install).start(&backend).await.unwrap();
        dispatch(JobPhase::Remove).start(&backend).await.unwrap();

        assert_eq!(
            *backend.calls.lock().unwrap(),
            vec![
                "download 1 vim cn",
                "start 1",
                "install 1 vim",
                "start 1",
                "remove 1 vim",
                "start 1",
            ]
        );
    }

    #[tokio::test]
    async fn test_prepare_failure_skips_start() {
        let backend = ScriptedBackend {
            reject_prepare: true,
            ..ScriptedBackend::default()
        };
        let err = dispatch(JobPhase::Install).start(&backend).await.unwrap_err();
        assert!(matches!(err, Error::Backend(BackendError::DispatchFailed { .. })));
        assert_eq!(*backend.calls.lock().unwrap(), vec!["install 1 vim"]);
    }
}
