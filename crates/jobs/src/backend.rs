//! Contract of the package backend that executes jobs

use async_trait::async_trait;
use lastore_errors::Error;
use lastore_types::{JobId, PackageId, ProgressReport};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Engine that performs package operations on behalf of jobs
///
/// Every call returns as soon as the backend has accepted the request; the
/// work itself is reported later through the progress channel.
#[async_trait]
pub trait PackageBackend: Send + Sync {
    /// Prepare a download of `package_id` from the mirror `region`
    async fn download(&self, job_id: JobId, package_id: &PackageId, region: &str)
        -> Result<(), Error>;

    /// Prepare an installation of `package_id`
    async fn install(&self, job_id: JobId, package_id: &PackageId) -> Result<(), Error>;

    /// Prepare a removal of `package_id`
    async fn remove(&self, job_id: JobId, package_id: &PackageId) -> Result<(), Error>;

    /// Start the prepared operation for `job_id`
    async fn start(&self, job_id: JobId) -> Result<(), Error>;
}

/// Sending half of the backend progress channel
pub type ProgressSender = UnboundedSender<ProgressReport>;

/// Receiving half of the backend progress channel
pub type ProgressReceiver = UnboundedReceiver<ProgressReport>;

/// Create the channel a backend reports progress on
#[must_use]
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}
